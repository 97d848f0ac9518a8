use rns::poly::PolyRNS;

use crate::parameters::Parameters;

/// An RLWE element (c_0, ..., c_d) in the Q basis at some level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ciphertext {
    pub value: Vec<PolyRNS<u64>>,
}

impl Ciphertext {
    pub fn new(params: &Parameters, degree: usize, level: usize) -> Self {
        debug_assert!(level <= params.max_level());
        Self {
            value: (0..degree + 1)
                .map(|_| PolyRNS::<u64>::new(params.n(), level))
                .collect(),
        }
    }

    pub fn degree(&self) -> usize {
        self.value.len() - 1
    }

    pub fn level(&self) -> usize {
        self.value[0].level()
    }

    pub fn n(&self) -> usize {
        self.value[0].n()
    }

    pub fn is_ntt(&self) -> bool {
        self.value[0].is_ntt
    }

    /// Resizes the degree, allocating zero polynomials as needed.
    pub fn resize_degree(&mut self, degree: usize) {
        let n: usize = self.n();
        let level: usize = self.level();
        let is_ntt: bool = self.is_ntt();
        while self.value.len() < degree + 1 {
            let mut poly: PolyRNS<u64> = PolyRNS::<u64>::new(n, level);
            poly.is_ntt = is_ntt;
            self.value.push(poly);
        }
        self.value.truncate(degree + 1);
    }

    /// Drops levels levels from every component.
    pub fn drop_level(&mut self, levels: usize) {
        let level: usize = self.level();
        debug_assert!(levels <= level, "cannot drop {} levels from level {}", levels, level);
        self.value
            .iter_mut()
            .for_each(|p| p.truncate_level(level - levels));
    }

    pub fn copy_from(&mut self, other: &Ciphertext) {
        self.value.clear();
        self.value.extend(other.value.iter().cloned());
    }
}
