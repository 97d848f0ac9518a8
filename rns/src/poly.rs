/// Coefficient vector modulo a single prime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poly<O>(pub Vec<O>);

impl<O> Poly<O>
where
    O: Default + Clone,
{
    pub fn new(n: usize) -> Self {
        Self(vec![O::default(); n])
    }

    pub fn n(&self) -> usize {
        self.0.len()
    }
}

/// An RNS polynomial: one coefficient vector per prime, plus the
/// representation flag (natural or point-value after the forward NTT).
/// The effective level is the number of residue vectors minus one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolyRNS<O> {
    pub coeffs: Vec<Poly<O>>,
    pub is_ntt: bool,
}

impl<O> PolyRNS<O>
where
    O: Default + Clone,
{
    pub fn new(n: usize, level: usize) -> Self {
        Self {
            coeffs: vec![Poly::<O>::new(n); level + 1],
            is_ntt: false,
        }
    }

    pub fn n(&self) -> usize {
        self.coeffs[0].n()
    }

    pub fn level(&self) -> usize {
        self.coeffs.len() - 1
    }

    #[inline(always)]
    pub fn at(&self, i: usize) -> &Poly<O> {
        &self.coeffs[i]
    }

    #[inline(always)]
    pub fn at_mut(&mut self, i: usize) -> &mut Poly<O> {
        &mut self.coeffs[i]
    }

    /// Drops the topmost levels residue vectors.
    pub fn truncate_level(&mut self, level: usize) {
        self.coeffs.truncate(level + 1);
    }
}

impl PolyRNS<u64> {
    /// Copies the first level+1 residue vectors of a into self.
    pub fn copy_lvl(&mut self, level: usize, a: &PolyRNS<u64>) {
        debug_assert!(
            level <= a.level() && level <= self.level(),
            "invalid level: level={} a.level()={} self.level()={}",
            level,
            a.level(),
            self.level()
        );
        for i in 0..level + 1 {
            self.coeffs[i].0.copy_from_slice(&a.coeffs[i].0);
        }
        self.is_ntt = a.is_ntt;
    }

    pub fn zero(&mut self) {
        self.coeffs.iter_mut().for_each(|p| p.0.fill(0));
        self.is_ntt = false;
    }
}
