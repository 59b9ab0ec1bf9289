#[cfg(test)]
mod hexcode_proptests {
    use proptest::prelude::*;

    use hexcode::{HexBuilder, HexReader};

    pub fn config_strategy() -> impl Strategy<Value = (Vec<u8>, f64, bool)> {
        (
            prop::collection::vec(any::<u8>(), 1..=48),
            prop_oneof![Just(0.1), Just(0.5), Just(1.0), Just(2.0)],
            any::<bool>(),
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(12))]

        #[test]
        fn proptest_round_trip(params in config_strategy()) {
            let (data, factor, masking) = params;

            let code = HexBuilder::new(&data)
                .error_correction_factor(factor)
                .masking(masking)
                .build()
                .unwrap();

            let img = image::DynamicImage::ImageLuma8(code.to_image(0.8));
            let decoded = HexReader::new().read(&img).expect("Failed to read hexagonal code");

            prop_assert_eq!(data, decoded);
        }
    }

    proptest! {
        #[test]
        #[ignore]
        fn proptest_large_payloads(data in prop::collection::vec(any::<u8>(), 1..=256)) {
            let code = HexBuilder::new(&data).build().unwrap();

            let img = code.to_image(1.0);
            let decoded = HexReader::new().read(&img).expect("Failed to read hexagonal code");

            prop_assert_eq!(data, decoded);
        }
    }
}

#[cfg(test)]
mod hexcode_tests {
    use image::{GrayImage, Luma};
    use imageproc::geometric_transformations::{
        rotate_about_center, warp, Interpolation, Projection,
    };
    use test_case::test_case;

    use hexcode::{ErrorKind, HexBuilder, HexError, HexReader};

    fn pad(img: &GrayImage, margin: u32) -> GrayImage {
        let (w, h) = img.dimensions();
        let mut res = GrayImage::from_pixel(w + 2 * margin, h + 2 * margin, Luma([255]));
        image::imageops::replace(&mut res, img, margin as i64, margin as i64);
        res
    }

    #[test_case(b"a".to_vec(), 0.5, true, 0.7; "test_hexcode_1")]
    #[test_case(b"Hello, World!".to_vec(), 0.5, true, 0.8; "test_hexcode_2")]
    #[test_case(b"Hello, World!".to_vec(), 2.0, false, 0.8; "test_hexcode_3")]
    #[test_case(vec![0; 8], 0.5, true, 1.0; "test_hexcode_4")]
    #[test_case(vec![0xff; 32], 0.1, true, 1.0; "test_hexcode_5")]
    #[test_case((0..100u8).collect::<Vec<u8>>(), 1.0, true, 1.0; "test_hexcode_6")]
    fn test_hexcode(data: Vec<u8>, factor: f64, masking: bool, scale: f64) {
        let code = HexBuilder::new(&data)
            .error_correction_factor(factor)
            .masking(masking)
            .build()
            .unwrap();

        let img = image::DynamicImage::ImageLuma8(code.to_image(scale));
        let decoded = HexReader::new().read(&img).expect("Failed to read hexagonal code");

        assert_eq!(data, decoded);
    }

    #[test_case(90.0)]
    #[test_case(30.0)]
    #[test_case(-75.0)]
    #[test_case(200.0)]
    fn test_rotated(degrees: f32) {
        let data = b"spinning around";
        let code = HexBuilder::new(data).build().unwrap();
        let img = pad(&code.to_image(1.0), 100);

        let theta = degrees.to_radians();
        let img = rotate_about_center(&img, theta, Interpolation::Nearest, Luma([255]));

        assert_eq!(HexReader::new().read(&img).unwrap(), data);
    }

    #[test]
    fn test_perspective() {
        let data = b"tilted away";
        let code = HexBuilder::new(data).build().unwrap();
        let img = pad(&code.to_image(1.0), 60);

        let (w, h) = (img.width() as f32, img.height() as f32);
        let inset = w * 0.05;
        let from = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];
        let to = [(inset, 0.0), (w - inset, 0.0), (w, h), (0.0, h)];
        let projection = Projection::from_control_points(from, to).unwrap();
        let img = warp(&img, &projection, Interpolation::Bilinear, Luma([255]));

        assert_eq!(HexReader::new().read(&img).unwrap(), data);
    }

    #[test]
    fn test_uneven_lighting() {
        let data = b"in the shade";
        let code = HexBuilder::new(data).build().unwrap();
        let mut img = code.to_image(1.0);

        let w = img.width() as f32;
        for (x, _, p) in img.enumerate_pixels_mut() {
            p.0[0] = p.0[0].saturating_sub((100.0 * x as f32 / w) as u8);
        }

        assert_eq!(HexReader::new().read(&img).unwrap(), data);
    }

    #[test]
    fn test_inverted() {
        let data = b"negative";
        let code = HexBuilder::new(data).build().unwrap();
        let mut img = code.to_image(0.8);
        image::imageops::invert(&mut img);

        assert_eq!(HexReader::new().read(&img).unwrap(), data);
    }

    #[test]
    fn test_blank_image() {
        let img = GrayImage::from_pixel(400, 300, Luma([255]));

        let err = HexReader::new().read(&img).unwrap_err();
        assert_eq!(err, HexError::BoundingRectNotFound);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_oversized_payload() {
        let data = vec![1u8; 257];
        let err = HexBuilder::new(&data).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_svg() {
        let code = HexBuilder::new(b"vector").build().unwrap();
        let svg = code.to_svg(1.0).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
