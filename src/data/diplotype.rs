//! # Diplotype Arithmetic
//!
//! A diplotype is an ordered pair `(h0, h1)` of copying states, one per
//! haplotype strand. With [`HAP_STATES`] = 8 there are 64 diplotypes, so a
//! single `u64` records which of them are consistent with the observed
//! genotype over a segment: bit `h0 * 8 + h1` is set when `(h0, h1)` is allowed.
//!
//! The HMM engine never tests mask bits in its hot loop. Masks are expanded once
//! per segment into a [`CompatibleDiplotypes`] list, in ascending index order,
//! which is also the order of the corresponding output probabilities.

/// Number of copying states per haplotype strand
pub const HAP_STATES: usize = 8;

/// Number of ordered copying-state pairs
pub const N_DIPLOTYPES: usize = HAP_STATES * HAP_STATES;

const _: () = assert!(N_DIPLOTYPES == u64::BITS as usize);

/// An ordered pair of copying states, stored as its 0..64 index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Diplotype(u8);

impl Diplotype {
    /// Build from the copying state of each strand
    #[inline]
    pub fn new(h0: usize, h1: usize) -> Self {
        debug_assert!(h0 < HAP_STATES && h1 < HAP_STATES);
        Self((h0 * HAP_STATES + h1) as u8)
    }

    #[inline]
    pub fn from_index(idx: usize) -> Self {
        debug_assert!(idx < N_DIPLOTYPES);
        Self(idx as u8)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Copying state of the first strand
    #[inline]
    pub fn hap0(self) -> usize {
        (self.0 >> 3) as usize
    }

    /// Copying state of the second strand
    #[inline]
    pub fn hap1(self) -> usize {
        (self.0 & 7) as usize
    }
}

/// Number of diplotypes allowed by `mask`
#[inline]
pub fn count_diplotypes(mask: u64) -> usize {
    mask.count_ones() as usize
}

/// Mask for a segment carrying `n_het` heterozygous sites, where het `j`
/// distinguishes candidates by bit `j` of the copying state.
///
/// `(h0, h1)` is allowed iff the two states differ on every one of the low
/// `n_het` bits, i.e. the strands carry opposite alleles at every het.
/// A segment without hets allows all 64 diplotypes.
pub fn heterozygous_mask(n_het: usize) -> u64 {
    debug_assert!(n_het <= 3);
    let het_bits = (1usize << n_het) - 1;
    let mut mask = 0u64;
    for h0 in 0..HAP_STATES {
        for h1 in 0..HAP_STATES {
            if (h0 ^ h1) & het_bits == het_bits {
                mask |= 1u64 << Diplotype::new(h0, h1).index();
            }
        }
    }
    mask
}

/// Diplotypes allowed over one segment, in ascending index order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompatibleDiplotypes {
    diplotypes: Vec<Diplotype>,
}

impl CompatibleDiplotypes {
    /// Expand a 64-bit compatibility mask
    pub fn from_mask(mask: u64) -> Self {
        let mut diplotypes = Vec::with_capacity(count_diplotypes(mask));
        let mut rest = mask;
        while rest != 0 {
            let d = rest.trailing_zeros() as usize;
            diplotypes.push(Diplotype::from_index(d));
            rest &= rest - 1;
        }
        Self { diplotypes }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.diplotypes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.diplotypes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Diplotype> + '_ {
        self.diplotypes.iter().copied()
    }
}
