use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Sub};

// GF(256) with primitive polynomial x^8 + x^4 + x^3 + x^2 + 1 and generator 2
//------------------------------------------------------------------------------

const PRIMITIVE: u16 = 0x11d;

const fn build_tables() -> ([u8; 256], [u8; 256]) {
    let mut exp = [0u8; 256];
    let mut log = [0u8; 256];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE;
        }
        i += 1;
    }
    exp[255] = exp[0];
    (exp, log)
}

const TABLES: ([u8; 256], [u8; 256]) = build_tables();

pub const EXP_TABLE: [u8; 256] = TABLES.0;

pub const LOG_TABLE: [u8; 256] = TABLES.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct G(pub u8);

impl G {
    /// α^i
    pub fn gen_pow(i: usize) -> G {
        G(EXP_TABLE[i % 255])
    }

    pub fn log(self) -> usize {
        debug_assert!(self.0 != 0, "Log of zero is undefined");
        LOG_TABLE[self.0 as usize] as usize
    }
}

impl From<G> for u8 {
    fn from(g: G) -> u8 {
        g.0
    }
}

impl Add for G {
    type Output = G;

    fn add(self, rhs: G) -> G {
        G(self.0 ^ rhs.0)
    }
}

impl AddAssign for G {
    fn add_assign(&mut self, rhs: G) {
        self.0 ^= rhs.0;
    }
}

impl Sub for G {
    type Output = G;

    fn sub(self, rhs: G) -> G {
        G(self.0 ^ rhs.0)
    }
}

impl Mul for G {
    type Output = G;

    fn mul(self, rhs: G) -> G {
        if self.0 == 0 || rhs.0 == 0 {
            return G(0);
        }
        G::gen_pow(self.log() + rhs.log())
    }
}

impl MulAssign for G {
    fn mul_assign(&mut self, rhs: G) {
        *self = *self * rhs;
    }
}

impl Div for G {
    type Output = G;

    fn div(self, rhs: G) -> G {
        debug_assert!(rhs.0 != 0, "Division by zero in GF(256)");
        if self.0 == 0 {
            return G(0);
        }
        G::gen_pow(self.log() + 255 - rhs.log())
    }
}

/// Generator polynomial `Π (x − α^i)` for `i` in `0..ecc_len`, highest degree first, leading 1
/// included.
pub fn generator_polynomial(ecc_len: usize) -> Vec<G> {
    let mut poly = vec![G(1)];
    for i in 0..ecc_len {
        let root = G::gen_pow(i);
        let mut next = vec![G(0); poly.len() + 1];
        for (j, &c) in poly.iter().enumerate() {
            next[j] += c;
            next[j + 1] += c * root;
        }
        poly = next;
    }
    poly
}
