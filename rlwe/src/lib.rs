pub mod ciphertext;
pub mod decryptor;
pub mod elem;
pub mod encryptor;
pub mod key_generator;
pub mod key_switching;
pub mod keys;
pub mod parameters;
