//! Image decoding for texture uploads
//!
//! Wraps the `image` crate: any BMP, PNG or JPEG file is decoded into a
//! tightly packed RGB8 or RGBA8 buffer, optionally flipped so the first row
//! in memory is the bottom row of the picture (the order OpenGL expects).

use std::path::Path;
use image::{DynamicImage, imageops};
use crate::assets::AssetError;

/// Channel layout of decoded pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelLayout {
    /// 3 bytes per pixel
    Rgb,
    /// 4 bytes per pixel
    Rgba,
}

impl PixelLayout {
    /// Bytes per pixel
    pub fn channels(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Decoded image data ready for GPU upload
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Raw pixel bytes, rows tightly packed
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Channel layout of `data`
    pub layout: PixelLayout,
}

impl ImageData {
    /// Decode an image file
    pub fn from_file<P: AsRef<Path>>(path: P, layout: PixelLayout, flip_vertically: bool) -> Result<Self, AssetError> {
        let path_ref = path.as_ref();

        log::debug!("Decoding image {:?} as {:?}", path_ref, layout);

        let img = image::open(path_ref)
            .map_err(|e| AssetError::LoadFailed(format!("{}: {}", path_ref.display(), e)))?;

        let decoded = Self::from_dynamic(img, layout, flip_vertically);
        log::debug!("Decoded {}x{} from {:?}", decoded.width, decoded.height, path_ref);
        Ok(decoded)
    }

    fn from_dynamic(img: DynamicImage, layout: PixelLayout, flip_vertically: bool) -> Self {
        let (width, height, data) = match layout {
            PixelLayout::Rgb => {
                let mut buffer = img.to_rgb8();
                if flip_vertically {
                    imageops::flip_vertical_in_place(&mut buffer);
                }
                let (w, h) = buffer.dimensions();
                (w, h, buffer.into_raw())
            }
            PixelLayout::Rgba => {
                let mut buffer = img.to_rgba8();
                if flip_vertically {
                    imageops::flip_vertical_in_place(&mut buffer);
                }
                let (w, h) = buffer.dimensions();
                (w, h, buffer.into_raw())
            }
        };

        Self { data, width, height, layout }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    /// Two-row image: red on top, blue on the bottom
    fn red_over_blue(format: ImageFormat) -> Vec<u8> {
        let mut img = RgbImage::new(2, 2);
        for x in 0..2 {
            img.put_pixel(x, 0, Rgb([255, 0, 0]));
            img.put_pixel(x, 1, Rgb([0, 0, 255]));
        }
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img).write_to(&mut bytes, format).unwrap();
        bytes.into_inner()
    }

    fn decode(bytes: &[u8], layout: PixelLayout, flip_vertically: bool) -> ImageData {
        ImageData::from_dynamic(image::load_from_memory(bytes).unwrap(), layout, flip_vertically)
    }

    /// Pixel bytes at `(x, y)` in memory order
    fn pixel(img: &ImageData, x: u32, y: u32) -> Option<&[u8]> {
        if x >= img.width || y >= img.height {
            return None;
        }
        let channels = img.layout.channels();
        let start = (y as usize * img.width as usize + x as usize) * channels;
        img.data.get(start..start + channels)
    }

    #[test]
    fn bmp_decodes_top_row_first_without_flip() {
        let img = decode(&red_over_blue(ImageFormat::Bmp), PixelLayout::Rgb, false);
        assert_eq!(img.layout, PixelLayout::Rgb);
        assert_eq!(img.data.len(), 2 * 2 * 3);
        assert_eq!(pixel(&img, 0, 0), Some(&[255u8, 0, 0] as &[u8]));
        assert_eq!(pixel(&img, 1, 1), Some(&[0u8, 0, 255] as &[u8]));
    }

    #[test]
    fn flip_puts_bottom_row_first() {
        let img = decode(&red_over_blue(ImageFormat::Bmp), PixelLayout::Rgb, true);
        assert_eq!(pixel(&img, 0, 0), Some(&[0u8, 0, 255] as &[u8]));
        assert_eq!(pixel(&img, 0, 1), Some(&[255u8, 0, 0] as &[u8]));
    }

    #[test]
    fn png_alpha_survives_rgba_decode() {
        let mut sprite = RgbaImage::new(1, 2);
        sprite.put_pixel(0, 0, Rgba([10, 20, 30, 0]));
        sprite.put_pixel(0, 1, Rgba([40, 50, 60, 255]));
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(sprite).write_to(&mut bytes, ImageFormat::Png).unwrap();

        let img = decode(bytes.get_ref(), PixelLayout::Rgba, true);
        assert_eq!(pixel(&img, 0, 0), Some(&[40u8, 50, 60, 255] as &[u8]));
        assert_eq!(pixel(&img, 0, 1), Some(&[10u8, 20, 30, 0] as &[u8]));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let result = ImageData::from_file("definitely/not/here.bmp", PixelLayout::Rgb, false);
        assert!(matches!(result, Err(AssetError::LoadFailed(_))));
    }

    #[test]
    fn buffer_is_tightly_packed_for_both_layouts() {
        let bytes = red_over_blue(ImageFormat::Png);
        for layout in [PixelLayout::Rgb, PixelLayout::Rgba] {
            let img = decode(&bytes, layout, false);
            assert_eq!(img.data.len(), img.width as usize * img.height as usize * layout.channels());
            assert_eq!(pixel(&img, 2, 0), None);
            assert_eq!(pixel(&img, 0, 2), None);
        }
    }
}
