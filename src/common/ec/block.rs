use super::galois::{generator_polynomial, G};
use crate::common::error::{HexError, HexResult};

pub const MAX_BLOCK_SIZE: usize = 255;

// Reed-Solomon block
//------------------------------------------------------------------------------

/// One Reed-Solomon codeword: `dlen` data bytes followed by `len - dlen` parity bytes. Byte `i`
/// is the coefficient of `x^(len - 1 - i)`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Block {
    pub data: [u8; MAX_BLOCK_SIZE],
    // Block length
    pub len: usize,
    // Data length
    pub dlen: usize,
}

impl Block {
    pub fn new(raw: &[u8], len: usize) -> Self {
        debug_assert!(len <= MAX_BLOCK_SIZE, "Block too long: {len}");
        debug_assert!(raw.len() <= len, "Data longer than block: {} > {len}", raw.len());

        let dlen = raw.len();
        let mut data = [0u8; MAX_BLOCK_SIZE];
        data[..dlen].copy_from_slice(raw);
        let ecc = ecc_per_block(raw, len - dlen);
        data[dlen..len].copy_from_slice(&ecc);
        Self { data, len, dlen }
    }

    pub fn with_encoded(encoded: &[u8], dlen: usize) -> Self {
        let len = encoded.len();
        debug_assert!(len <= MAX_BLOCK_SIZE, "Block too long: {len}");

        let mut data = [0u8; MAX_BLOCK_SIZE];
        data[..len].copy_from_slice(encoded);
        Self { data, len, dlen }
    }

    pub fn ec_len(&self) -> usize {
        self.len - self.dlen
    }

    pub fn full(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn data(&self) -> &[u8] {
        &self.data[..self.dlen]
    }

    pub fn ecc(&self) -> &[u8] {
        &self.data[self.dlen..self.len]
    }
}

// Performs polynomial long division of the data polynomial, shifted by the parity length, by the
// generator polynomial. The remainder's coefficients are the parity bytes.
pub fn ecc_per_block(block: &[u8], ecc_len: usize) -> Vec<u8> {
    let len = block.len();
    let gen_poly = generator_polynomial(ecc_len);

    let mut res = block.to_vec();
    res.resize(len + ecc_len, 0);

    for i in 0..len {
        let lead = G(res[i]);
        if lead.0 == 0 {
            continue;
        }
        for (u, &g) in res[i + 1..=i + ecc_len].iter_mut().zip(gen_poly[1..].iter()) {
            *u ^= (g * lead).0;
        }
    }

    res.split_off(len)
}

// Rectifier
//------------------------------------------------------------------------------

impl Block {
    /// Corrects up to `ec_len / 2` byte errors in place.
    pub fn rectify(&mut self) -> HexResult<&[u8]> {
        // Compute syndromes
        let synd = match self.syndromes() {
            None => return Ok(self.data()),
            Some(s) => s,
        };

        // Error locator polynomial
        let sig = self.berlekamp_massey(&synd)?;
        let err_loc = self.chien_search(&sig)?;

        // Error evaluator
        let omg = self.omega(&synd, &sig);

        // Formal derivative of sigma, only odd powers survive in characteristic 2
        let mut dsig = vec![G(0); sig.len()];
        for i in (1..sig.len()).step_by(2) {
            dsig[i - 1] = sig[i];
        }

        // Error magnitudes, XORed onto the received bytes
        for &i in err_loc.iter() {
            let p = self.len - 1 - i;
            let x = G::gen_pow(p);
            let xinv = G::gen_pow(255 - p);
            let den = eval_poly(&dsig, xinv);
            if den.0 == 0 {
                return Err(HexError::TooManyErrors);
            }
            let mag = x * (eval_poly(&omg, xinv) / den);
            self.data[i] ^= mag.0;
        }

        match self.syndromes() {
            None => Ok(self.data()),
            Some(_) => Err(HexError::TooManyErrors),
        }
    }

    // S_i = C(α^i), None if the block is a valid codeword
    fn syndromes(&self) -> Option<Vec<G>> {
        let synd: Vec<G> = (0..self.ec_len())
            .map(|i| {
                let x = G::gen_pow(i);
                self.full().iter().fold(G(0), |acc, &b| acc * x + G(b))
            })
            .collect();

        if synd.iter().all(|s| s.0 == 0) {
            None
        } else {
            Some(synd)
        }
    }

    // Sigma polynomial, lowest degree first
    fn berlekamp_massey(&self, synd: &[G]) -> HexResult<Vec<G>> {
        let n = synd.len();
        let mut l = 0usize;
        let mut m = 1usize;
        let mut b = G(1);
        let mut cx = vec![G(0); n + 1];
        let mut bx = vec![G(0); n + 1];
        cx[0] = G(1);
        bx[0] = G(1);

        for k in 0..n {
            // Discrepancy
            let mut d = synd[k];
            for i in 1..=l {
                d += cx[i] * synd[k - i];
            }

            if d.0 == 0 {
                m += 1;
                continue;
            }

            let tx = cx.clone();
            let scale = d / b;
            for i in 0..(n + 1).saturating_sub(m) {
                cx[i + m] += scale * bx[i];
            }

            if 2 * l <= k {
                l = k + 1 - l;
                bx = tx;
                b = d;
                m = 1;
            } else {
                m += 1;
            }
        }

        if 2 * l > n {
            return Err(HexError::TooManyErrors);
        }
        cx.truncate(l + 1);
        Ok(cx)
    }

    // Byte indices whose locator X^-1 is a root of sigma
    fn chien_search(&self, sig: &[G]) -> HexResult<Vec<usize>> {
        let err_loc: Vec<usize> = (0..self.len)
            .filter(|&i| {
                let p = self.len - 1 - i;
                eval_poly(sig, G::gen_pow(255 - p)).0 == 0
            })
            .collect();

        if err_loc.len() + 1 != sig.len() {
            return Err(HexError::TooManyErrors);
        }
        Ok(err_loc)
    }

    // Omega = S(x) * sigma(x) mod x^ec_len
    fn omega(&self, synd: &[G], sig: &[G]) -> Vec<G> {
        let n = synd.len();
        let mut omg = vec![G(0); n];
        for (i, &s) in synd.iter().enumerate() {
            for (j, &c) in sig.iter().enumerate().take(n - i) {
                omg[i + j] += s * c;
            }
        }
        omg
    }
}

// Evaluates a lowest-degree-first polynomial
fn eval_poly(poly: &[G], x: G) -> G {
    let mut res = G(0);
    let mut xpow = G(1);
    for &coeff in poly {
        res += coeff * xpow;
        xpow *= x;
    }
    res
}
