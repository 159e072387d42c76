//! End-to-end properties of the conversion engine.

use approx::assert_abs_diff_eq;
use that_core::prelude::*;
use that_core::scalar::{float_to_norm, norm_to_float, norm_to_norm};

fn fmt(ty: ElementType, size: u8, channels: u8) -> FormatInfo {
    FormatInfo::new(ty, size, channels)
}

/// Every scalar storage format the engine knows.
fn storage_formats(channels: u8) -> Vec<FormatInfo> {
    ElementType::ALL
        .into_iter()
        .flat_map(|ty| [1u8, 2, 4, 8].map(|size| fmt(ty, size, channels)))
        .filter(|f| f.has_storage())
        .collect()
}

#[test]
fn test_norm_roundtrip_u8() {
    for v in 0..=u8::MAX {
        let f: f64 = norm_to_float(v);
        assert_eq!(float_to_norm::<u8, f64>(f), v);
    }
    assert_eq!(norm_to_norm::<u16, u8>(0xFF), 0xFFFF);
}

#[test]
fn test_channel_widen_every_pixel() {
    let (w, h) = (7, 5);
    let src: Vec<u8> = (0..w * h * 3).map(|i| (i % 255) as u8 + 1).collect();
    let format = fmt(ElementType::Unorm, 1, 3);
    let mut img = FormatedImage::from_raw(w, h, format, true, src.clone()).unwrap();
    img.re_format(fmt(ElementType::Unorm, 1, 4), true).unwrap();

    for (i, px) in img.raw_data().chunks_exact(4).enumerate() {
        assert_eq!(&px[..3], &src[i * 3..i * 3 + 3]);
        assert_eq!(px[3], 0);
    }
}

#[test]
fn test_transpose_in_place_is_involution_for_all_formats() {
    for format in storage_formats(2) {
        let n = 5;
        let original: Vec<u8> = (0..n * n * format.pixel_size())
            .map(|i| (i * 13 % 256) as u8)
            .collect();
        let mut img = FormatedImage::from_raw(n, n, format, true, original.clone()).unwrap();
        img.re_format(format, false).unwrap();
        img.re_format(format, true).unwrap();
        assert_eq!(img.raw_data(), &original[..], "{format}");
    }
}

#[test]
fn test_aliasing_equals_fresh_destination() {
    let formats = storage_formats(3);
    let (w, h) = (4, 3);
    for src_format in &formats {
        let src: Vec<u8> = (0..w * h * src_format.pixel_size())
            .map(|i| (i * 29 % 256) as u8)
            .collect();
        for dst_format in &formats {
            for (src_rm, dst_rm) in [(true, false), (false, true), (true, true)] {
                let params = ConvertParams::new(w, h, *src_format, *dst_format)
                    .with_layout(src_rm, dst_rm);

                let mut fresh = vec![0u8; params.dst_byte_size()];
                convert_buffer(&src, &mut fresh, &params).unwrap();

                let mut shared = src.clone();
                shared.resize(params.src_byte_size().max(params.dst_byte_size()), 0);
                convert_in_place(&mut shared, &params).unwrap();

                assert_eq!(
                    &shared[..params.dst_byte_size()],
                    &fresh[..],
                    "{src_format} -> {dst_format}"
                );
            }
        }
    }
}

#[test]
fn test_square_aliasing_with_format_change() {
    let n = 6;
    let src_format = fmt(ElementType::Unorm, 2, 2);
    let dst_format = fmt(ElementType::Float, 2, 2);
    let src: Vec<u8> = (0..n * n * 4).map(|i| (i * 7 % 256) as u8).collect();

    let mut in_place = FormatedImage::from_raw(n, n, src_format, true, src.clone()).unwrap();
    in_place.re_format(dst_format, false).unwrap();

    let source = FormatedImage::from_raw(n, n, src_format, true, src).unwrap();
    let copied = source.converted(dst_format, false).unwrap();

    assert_eq!(in_place, copied);
}

#[test]
fn test_srgb_roundtrip_bounded() {
    let n = 1001;
    let linear: Vec<f32> = (0..n).map(|i| i as f32 / (n - 1) as f32).collect();
    let bytes: Vec<u8> = bytemuck::cast_slice(&linear).to_vec();

    for (size, max) in [(1u8, u8::MAX as f64), (2, u16::MAX as f64)] {
        let mut img =
            FormatedImage::from_raw(n, 1, fmt(ElementType::Float, 4, 1), true, bytes.clone())
                .unwrap();
        img.re_format(fmt(ElementType::Srgb, size, 1), true).unwrap();
        img.re_format(fmt(ElementType::Float, 8, 1), true).unwrap();

        // Truncating quantization loses up to 1/max of encoded range and the
        // decode slope is at most 2.2, so 1/max alone is not reachable.
        let bound = 2.2 / max;
        for (i, &f) in linear.iter().enumerate() {
            let back: f64 = img.pixel(i, 0);
            assert!((back - f as f64).abs() <= bound, "size {size}: {f} -> {back}");
        }
    }
}

#[test]
fn test_unorm_rgb_to_float_scenario() {
    let mut img = FormatedImage::new(2, 2, fmt(ElementType::Unorm, 1, 3), true);
    img.set_pixel(0, 0, [255u8, 0, 0]);
    img.re_format(fmt(ElementType::Float, 4, 3), true).unwrap();

    let [r, g, b] = img.pixel::<[f32; 3]>(0, 0);
    assert_abs_diff_eq!(r, 1.0, epsilon = f32::EPSILON);
    assert_abs_diff_eq!(g, 0.0, epsilon = f32::EPSILON);
    assert_abs_diff_eq!(b, 0.0, epsilon = f32::EPSILON);
}

#[test]
fn test_unorm_to_snorm_scenario() {
    let format = fmt(ElementType::Unorm, 1, 1);
    let mut img = FormatedImage::from_raw(3, 1, format, true, vec![0, 128, 255]).unwrap();
    img.re_format(fmt(ElementType::Snorm, 1, 1), true).unwrap();
    let values: Vec<i8> = (0..3).map(|x| img.pixel::<i8>(x, 0)).collect();
    assert_eq!(values, vec![0, 64, 127]);
}

#[test]
fn test_failed_reformat_is_invisible() {
    let format = fmt(ElementType::Srgb, 1, 4);
    let mut img = FormatedImage::from_raw(2, 3, format, false, (0..24).collect()).unwrap();
    let before = img.clone();
    for channels in [4, 8, 1] {
        let target = fmt(ElementType::Float, 1, channels);
        for row_major in [true, false] {
            let err = img.re_format(target, row_major).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::CannotConvertFormat);
            assert_eq!(img, before);
        }
    }
}

#[test]
fn test_half_storage_roundtrip() {
    let values = [0.0f32, 0.5, -1.25, 1024.0, 65504.0];
    let img = FormatedImage::from_pixels(5, 1, &values).unwrap();
    let half = img.converted(fmt(ElementType::Float, 2, 1), true).unwrap();
    let back = half.converted(fmt(ElementType::Float, 4, 1), true).unwrap();
    assert_eq!(back.raw_data(), img.raw_data());
    assert_eq!(half.pixel::<Half>(3, 0), Half::from_f32(1024.0));
}
