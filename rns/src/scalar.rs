/// One scalar per prime of an RNS basis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScalarRNS<O>(pub Vec<O>);
