use base64::{Engine as _, engine::general_purpose::STANDARD as base64_engine};
use image::ColorType;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};

use crate::error::ThumbError;

/// 背景高斯模糊强度（标准差）
const BLUR_SIGMA: f32 = 20.0;

/// 背景压暗系数，保证前景文字可读
const BRIGHTNESS_FACTOR: f32 = 0.4;

/// JPEG 内嵌质量
const JPEG_QUALITY: u8 = 85;

fn resample_filter(optimize_speed: bool) -> FilterType {
    if optimize_speed {
        FilterType::Triangle
    } else {
        FilterType::Lanczos3
    }
}

/// 背景层：无视纵横比直接拉伸到画布尺寸，再整体模糊并压暗。
pub fn background_raster(
    src: &DynamicImage,
    canvas_w: u32,
    canvas_h: u32,
    optimize_speed: bool,
) -> RgbImage {
    let stretched = src.resize_exact(canvas_w, canvas_h, resample_filter(optimize_speed));
    let mut rgb = stretched.blur(BLUR_SIGMA).to_rgb8();
    darken_in_place(&mut rgb, BRIGHTNESS_FACTOR);
    rgb
}

/// 封面内嵌：等比铺满方形后裁去溢出（中心裁剪），保持原始清晰度。
pub fn art_raster(src: &DynamicImage, size: u32, optimize_speed: bool) -> RgbImage {
    src.resize_to_fill(size, size, resample_filter(optimize_speed))
        .to_rgb8()
}

/// 逐通道乘法压暗（image 自带的 brighten 是加法，不适用）
fn darken_in_place(img: &mut RgbImage, factor: f32) {
    for px in img.pixels_mut() {
        for c in px.0.iter_mut() {
            *c = (f32::from(*c) * factor).round() as u8;
        }
    }
}

/// 将栅格编码为 JPEG 并返回可放入 `<image href>` 的 Data URI。
pub fn jpeg_data_uri(rgb: &RgbImage) -> Result<String, ThumbError> {
    let mut out = Vec::new();
    let mut enc = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    enc.encode(rgb, rgb.width(), rgb.height(), ColorType::Rgb8.into())
        .map_err(|e| ThumbError::Render(format!("JPEG 编码失败: {e}")))?;
    let b64 = base64_engine.encode(out);
    Ok(format!("data:image/jpeg;base64,{b64}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn gradient_source(w: u32, h: u32) -> DynamicImage {
        let img = RgbImage::from_fn(w, h, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 11 % 256) as u8, 128])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn background_is_stretched_to_canvas_ignoring_aspect() {
        let src = gradient_source(64, 48);
        let bg = background_raster(&src, 320, 90, false);
        assert_eq!((bg.width(), bg.height()), (320, 90));
    }

    #[test]
    fn art_is_center_cropped_to_square() {
        let src = gradient_source(400, 100);
        let art = art_raster(&src, 200, false);
        assert_eq!((art.width(), art.height()), (200, 200));
    }

    #[test]
    fn darken_multiplies_channels() {
        let mut img = RgbImage::from_pixel(2, 2, Rgb([100, 200, 0]));
        darken_in_place(&mut img, 0.4);
        assert_eq!(img.get_pixel(0, 0).0, [40, 80, 0]);
    }

    #[test]
    fn data_uri_carries_jpeg_mime() {
        let img = RgbImage::from_pixel(4, 4, Rgb([10, 20, 30]));
        let uri = jpeg_data_uri(&img).expect("encode");
        assert!(uri.starts_with("data:image/jpeg;base64,"));
        assert!(uri.len() > "data:image/jpeg;base64,".len());
    }
}
