use rns::poly::PolyRNS;

/// A polynomial split over the Q and P bases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolyQP {
    pub q: PolyRNS<u64>,
    pub p: PolyRNS<u64>,
}

impl PolyQP {
    pub fn new(n: usize, level_q: usize, level_p: usize) -> Self {
        Self {
            q: PolyRNS::<u64>::new(n, level_q),
            p: PolyRNS::<u64>::new(n, level_p),
        }
    }

    pub fn n(&self) -> usize {
        self.q.n()
    }
}
