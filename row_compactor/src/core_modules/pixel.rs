// THEORY:
// The `Pixel` module is the most fundamental unit of the compactor. It is a
// "dumb" data container for a single RGBA pixel plus the one heuristic the row
// classifier needs from it: a coarse, packed color key.
//
// Key principles:
// 1) Single-pixel scope: nothing here reads neighbors or other rows.
// 2) Quantization is lossy and only ever feeds classification. The bytes that
//    end up in the output image are copied from the source buffer untouched.
// 3) Alpha is carried but never part of the key. Two pixels that differ only
//    in transparency are the same color for classification purposes.

pub mod pixel {
    pub type Byte = u8;
    pub type Bytes = Vec<Byte>;
    pub type Channel = Byte;
    pub type QuantizedKey = u32;
    pub type QuantizationFactor = u32;

    pub const CHANNELS: usize = 4;

    /// Channel width in the packed key, in bits.
    const KEY_CHANNEL_BITS: u32 = 8;

    /// A "dumb" data container representing a single RGBA pixel.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
        /// The alpha (transparency) channel value (0-255).
        pub alpha: Channel,
    }

    impl Pixel {
        pub fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel {
                red,
                green,
                blue,
                alpha,
            }
        }

        /// Packs the quantized red, green and blue channels into one integer.
        ///
        /// - Each channel is floored to `channel / factor`.
        /// - Channels are concatenated red, green, blue from the high byte down.
        /// - `factor` must be non-zero; callers validate it once per image.
        #[inline]
        pub fn quantized_key(&self, factor: QuantizationFactor) -> QuantizedKey {
            let red = self.red as QuantizedKey / factor;
            let green = self.green as QuantizedKey / factor;
            let blue = self.blue as QuantizedKey / factor;
            (red << (KEY_CHANNEL_BITS * 2)) | (green << KEY_CHANNEL_BITS) | blue
        }
    }

    impl From<&[Byte]> for Pixel {
        fn from(bytes: &[Byte]) -> Self {
            if bytes.len() != CHANNELS {
                panic!("Cannot convert {} bytes into pixel.", bytes.len());
            }
            Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3])
        }
    }

    impl From<Pixel> for Bytes {
        fn from(pixel: Pixel) -> Self {
            vec![pixel.red, pixel.green, pixel.blue, pixel.alpha]
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn key_floors_each_channel() {
            let pixel = Pixel::new(31, 16, 15, 255);
            assert_eq!(pixel.quantized_key(16), (1 << 16) | (1 << 8));
        }

        #[test]
        fn key_ignores_alpha() {
            let opaque = Pixel::new(200, 100, 50, 255);
            let clear = Pixel::new(200, 100, 50, 0);
            assert_eq!(opaque.quantized_key(16), clear.quantized_key(16));
        }

        #[test]
        fn factor_one_keeps_full_precision() {
            let pixel = Pixel::new(0xAB, 0xCD, 0xEF, 0x12);
            assert_eq!(pixel.quantized_key(1), 0x00AB_CDEF);
        }

        #[test]
        fn same_bucket_same_key() {
            let a = Pixel::new(0, 0, 0, 255);
            let b = Pixel::new(15, 15, 15, 255);
            let c = Pixel::new(16, 15, 15, 255);
            assert_eq!(a.quantized_key(16), b.quantized_key(16));
            assert_ne!(a.quantized_key(16), c.quantized_key(16));
        }

        #[test]
        fn bytes_round_trip() {
            let bytes: &[u8] = &[1, 2, 3, 4];
            let pixel = Pixel::from(bytes);
            assert_eq!(Bytes::from(pixel), vec![1, 2, 3, 4]);
        }

        #[test]
        #[should_panic(expected = "Cannot convert 3 bytes into pixel.")]
        fn short_slice_panics() {
            let bytes: &[u8] = &[1, 2, 3];
            let _ = Pixel::from(bytes);
        }
    }
}
