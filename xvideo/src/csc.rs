//! Colorimetry coefficients for the mixer color space converters.
//!
//! Coefficients are Q12 fixed point (4096 = 1.0). Offsets are given for
//! 8 bit components and scaled to the stream depth when they are written.

use crate::video::ColorDepth;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fractional bits of a coefficient.
pub const COEFF_FRACTION_BITS: u32 = 12;

/// ITU-R colorimetry.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorStandard {
    /// SDTV
    Bt601,
    /// HDTV
    #[default]
    Bt709,
    /// UHDTV
    Bt2020,
}

/// Quantization range.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRange {
    /// Components use the full code range.
    Full,
    /// Luma uses 16..=235 and chroma 16..=240 (8 bit).
    #[default]
    Limited,
}

/// A 3x3 conversion matrix with per-output offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CscMatrix {
    /// Row-major coefficients `K11..K33`.
    pub k: [[i16; 3]; 3],
    /// Offsets added to the outputs, for 8 bit components.
    pub offsets: [i16; 3],
}

impl CscMatrix {
    /// Offsets scaled to `depth`.
    pub fn offsets_for(&self, depth: ColorDepth) -> [i32; 3] {
        let shift = depth.shift_from_8();
        self.offsets.map(|o| (o as i32) << shift)
    }

    /// Converts one 8 bit pixel. Used to check the tables.
    pub fn apply(&self, px: [u8; 3]) -> [i32; 3] {
        let mut out = [0i32; 3];
        for (row, o) in out.iter_mut().enumerate() {
            let sum: i32 = (0..3)
                .map(|col| self.k[row][col] as i32 * px[col] as i32)
                .sum();
            let rounded = (sum + (1 << (COEFF_FRACTION_BITS - 1))) >> COEFF_FRACTION_BITS;
            *o = rounded + self.offsets[row] as i32;
        }
        out
    }
}

const RGB_TO_YUV: [[CscMatrix; 2]; 3] = [
    [
        CscMatrix {
            k: [[1225, 2404, 467], [-691, -1357, 2048], [2048, -1715, -333]],
            offsets: [0, 128, 128],
        },
        CscMatrix {
            k: [[1052, 2065, 401], [-607, -1192, 1799], [1799, -1506, -293]],
            offsets: [16, 128, 128],
        },
    ],
    [
        CscMatrix {
            k: [[871, 2929, 296], [-469, -1579, 2048], [2048, -1860, -188]],
            offsets: [0, 128, 128],
        },
        CscMatrix {
            k: [[748, 2516, 254], [-412, -1387, 1799], [1799, -1634, -165]],
            offsets: [16, 128, 128],
        },
    ],
    [
        CscMatrix {
            k: [[1076, 2777, 243], [-572, -1476, 2048], [2048, -1883, -165]],
            offsets: [0, 128, 128],
        },
        CscMatrix {
            k: [[924, 2385, 209], [-502, -1297, 1799], [1799, -1654, -145]],
            offsets: [16, 128, 128],
        },
    ],
];

const YUV_TO_RGB: [[CscMatrix; 2]; 3] = [
    [
        CscMatrix {
            k: [[4096, 0, 5743], [4096, -1410, -2925], [4096, 7258, 0]],
            offsets: [-179, 135, -227],
        },
        CscMatrix {
            k: [[4769, 0, 6537], [4769, -1605, -3330], [4769, 8263, 0]],
            offsets: [-223, 136, -277],
        },
    ],
    [
        CscMatrix {
            k: [[4096, 0, 6450], [4096, -767, -1917], [4096, 7601, 0]],
            offsets: [-202, 84, -238],
        },
        CscMatrix {
            k: [[4769, 0, 7343], [4769, -873, -2183], [4769, 8652, 0]],
            offsets: [-248, 77, -289],
        },
    ],
    [
        CscMatrix {
            k: [[4096, 0, 6040], [4096, -674, -2340], [4096, 7706, 0]],
            offsets: [-189, 94, -241],
        },
        CscMatrix {
            k: [[4769, 0, 6876], [4769, -767, -2664], [4769, 8773, 0]],
            offsets: [-234, 89, -293],
        },
    ],
];

/// Matrix converting RGB to YCbCr.
pub fn rgb_to_yuv(standard: ColorStandard, range: ColorRange) -> CscMatrix {
    RGB_TO_YUV[standard as usize][range as usize]
}

/// Matrix converting YCbCr to RGB.
pub fn yuv_to_rgb(standard: ColorStandard, range: ColorRange) -> CscMatrix {
    YUV_TO_RGB[standard as usize][range as usize]
}
