use super::header::Header;
use super::utils::{HasHeader, RosMsg};
use crate::stamp_sync_sdk::error::ExtractError;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use camino::Utf8Path;
use image::{GrayImage, ImageBuffer, ImageFormat, Luma, RgbImage, RgbaImage};
use ndarray::{Array2, Array3, ArrayD};
use serde::{Deserialize, Serialize};

pub const DATA_SCHEMA_DEF: &str = "std_msgs/Header header\nuint32 height\nuint32 width\nstring encoding\nuint8 is_bigendian\nuint32 step\nuint8[] data\n================================================================================\nMSG: std_msgs/Header\nbuiltin_interfaces/Time stamp\nstring frame_id\n================================================================================\nMSG: builtin_interfaces/Time\nint32 sec\nuint32 nanosec\n";

pub const PNG_EXTENSION: &str = "png";
pub const NPY_EXTENSION: &str = "npy";

/// `sensor_msgs/msg/Image`
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct RosImage {
    pub header: Header,
    pub height: u32,
    pub width: u32,
    pub encoding: String,
    pub is_bigendian: u8,
    pub step: u32,
    pub data: Vec<u8>,
}

impl RosMsg for RosImage {
    fn get_schema_name() -> &'static str {
        "sensor_msgs/msg/Image"
    }

    fn get_schema_def() -> &'static [u8] {
        DATA_SCHEMA_DEF.as_bytes()
    }
}

impl HasHeader for RosImage {
    fn get_header(&self) -> &Header {
        &self.header
    }
}

/// Pixels of a decoded image. Colour images are kept in RGB(A) order.
#[derive(Debug, PartialEq)]
pub enum ImageData {
    Gray(Array2<u8>),
    Gray16(Array2<u16>),
    Rgb(Array3<u8>),
    Rgba(Array3<u8>),
    Float(Array2<f32>),
}

impl ImageData {
    pub fn channels(&self) -> usize {
        match self {
            ImageData::Gray(_) | ImageData::Gray16(_) | ImageData::Float(_) => 1,
            ImageData::Rgb(_) => 3,
            ImageData::Rgba(_) => 4,
        }
    }

    fn sample_bytes(&self) -> usize {
        match self {
            ImageData::Gray(_) | ImageData::Rgb(_) | ImageData::Rgba(_) => 1,
            ImageData::Gray16(_) => 2,
            ImageData::Float(_) => 4,
        }
    }

    /// Number of samples held.
    pub fn len(&self) -> usize {
        match self {
            ImageData::Gray(arr) => arr.len(),
            ImageData::Gray16(arr) => arr.len(),
            ImageData::Rgb(arr) | ImageData::Rgba(arr) => arr.len(),
            ImageData::Float(arr) => arr.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PixelLayout {
    Gray8,
    Gray16,
    Bgr8,
    Rgb8,
    Bgra8,
    Rgba8,
    Float32,
}

impl PixelLayout {
    fn from_encoding(encoding: &str) -> Option<Self> {
        match encoding {
            "mono8" | "8UC1" => Some(Self::Gray8),
            "mono16" | "16UC1" => Some(Self::Gray16),
            "bgr8" | "8UC3" => Some(Self::Bgr8),
            "rgb8" => Some(Self::Rgb8),
            "bgra8" | "8UC4" => Some(Self::Bgra8),
            "rgba8" => Some(Self::Rgba8),
            "32FC1" => Some(Self::Float32),
            // raw bayer mosaics are stored as they come, one channel
            bayer if bayer.starts_with("bayer_") && bayer.ends_with("16") => Some(Self::Gray16),
            bayer if bayer.starts_with("bayer_") && bayer.ends_with('8') => Some(Self::Gray8),
            _ => None,
        }
    }

    fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::Gray16 => 2,
            Self::Bgr8 | Self::Rgb8 => 3,
            Self::Bgra8 | Self::Rgba8 | Self::Float32 => 4,
        }
    }
}

#[derive(Debug)]
pub struct Image {
    pub header: Header,
    pub height: u32,
    pub width: u32,
    pub encoding: String,
    pub image: ImageData,
}

impl Image {
    pub fn from_ros_image(ros_image: &RosImage) -> Result<Image, ExtractError> {
        let layout = PixelLayout::from_encoding(&ros_image.encoding).ok_or_else(|| {
            ExtractError::UnsupportedEncoding {
                encoding: ros_image.encoding.clone(),
                target: "decoding",
            }
        })?;
        let pixels = packed_rows(ros_image, layout)?;
        let (h, w) = (ros_image.height as usize, ros_image.width as usize);
        let big_endian = ros_image.is_bigendian != 0;

        let image = match layout {
            PixelLayout::Gray8 => ImageData::Gray(shaped2(pixels, h, w)?),
            PixelLayout::Gray16 => {
                let values = pixels
                    .chunks_exact(2)
                    .map(|b| match big_endian {
                        true => BigEndian::read_u16(b),
                        false => LittleEndian::read_u16(b),
                    })
                    .collect();
                ImageData::Gray16(shaped2(values, h, w)?)
            }
            PixelLayout::Float32 => {
                let values = pixels
                    .chunks_exact(4)
                    .map(|b| match big_endian {
                        true => BigEndian::read_f32(b),
                        false => LittleEndian::read_f32(b),
                    })
                    .collect();
                ImageData::Float(shaped2(values, h, w)?)
            }
            PixelLayout::Rgb8 => ImageData::Rgb(shaped3(pixels, h, w, 3)?),
            PixelLayout::Bgr8 => {
                let mut arr = shaped3(pixels, h, w, 3)?;
                swap_red_blue(&mut arr);
                ImageData::Rgb(arr)
            }
            PixelLayout::Rgba8 => ImageData::Rgba(shaped3(pixels, h, w, 4)?),
            PixelLayout::Bgra8 => {
                let mut arr = shaped3(pixels, h, w, 4)?;
                swap_red_blue(&mut arr);
                ImageData::Rgba(arr)
            }
        };

        Ok(Image {
            header: ros_image.header.clone(),
            height: ros_image.height,
            width: ros_image.width,
            encoding: ros_image.encoding.clone(),
            image,
        })
    }

    pub fn save_png<P: AsRef<Utf8Path>>(&self, path: P) -> Result<(), ExtractError> {
        let (w, h) = (self.width, self.height);
        let path = path.as_ref();
        let saved = match &self.image {
            ImageData::Gray(arr) => GrayImage::from_raw(w, h, arr.iter().copied().collect())
                .map(|img| img.save_with_format(path, ImageFormat::Png)),
            ImageData::Gray16(arr) => {
                ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w, h, arr.iter().copied().collect())
                    .map(|img| img.save_with_format(path, ImageFormat::Png))
            }
            ImageData::Rgb(arr) => RgbImage::from_raw(w, h, arr.iter().copied().collect())
                .map(|img| img.save_with_format(path, ImageFormat::Png)),
            ImageData::Rgba(arr) => RgbaImage::from_raw(w, h, arr.iter().copied().collect())
                .map(|img| img.save_with_format(path, ImageFormat::Png)),
            ImageData::Float(_) => {
                return Err(ExtractError::UnsupportedEncoding {
                    encoding: self.encoding.clone(),
                    target: "png",
                })
            }
        };
        match saved {
            Some(result) => result.map_err(|source| ExtractError::Image {
                path: path.to_path_buf(),
                source,
            }),
            None => Err(self.size_error()),
        }
    }

    /// Every channel cast to `f32`, shaped `(height, width)` or
    /// `(height, width, channels)`.
    pub fn to_f32_array(&self) -> ArrayD<f32> {
        match &self.image {
            ImageData::Gray(arr) => arr.mapv(f32::from).into_dyn(),
            ImageData::Gray16(arr) => arr.mapv(f32::from).into_dyn(),
            ImageData::Rgb(arr) | ImageData::Rgba(arr) => arr.mapv(f32::from).into_dyn(),
            ImageData::Float(arr) => arr.clone().into_dyn(),
        }
    }

    pub fn save_npy<P: AsRef<Utf8Path>>(&self, path: P) -> Result<(), ExtractError> {
        let path = path.as_ref();
        ndarray_npy::write_npy(path, &self.to_f32_array()).map_err(|source| ExtractError::Npy {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Pixel buffer that does not match the declared `width` and `height`.
    fn size_error(&self) -> ExtractError {
        let sample_bytes = self.image.sample_bytes();
        ExtractError::ImageSize {
            encoding: self.encoding.clone(),
            width: self.width,
            height: self.height,
            expected: self.width as usize
                * self.height as usize
                * self.image.channels()
                * sample_bytes,
            actual: self.image.len() * sample_bytes,
        }
    }
}

impl HasHeader for Image {
    fn get_header(&self) -> &Header {
        &self.header
    }
}

/// Pixel bytes with the row padding (`step` beyond `width * bpp`) removed.
fn packed_rows(ros_image: &RosImage, layout: PixelLayout) -> Result<Vec<u8>, ExtractError> {
    let (h, w) = (ros_image.height as usize, ros_image.width as usize);
    let row_len = w * layout.bytes_per_pixel();
    let step = match ros_image.step as usize {
        0 => row_len,
        step => step,
    };
    let expected = match h {
        0 => 0,
        h => step * (h - 1) + row_len,
    };
    if step < row_len || ros_image.data.len() < expected {
        return Err(ExtractError::ImageSize {
            encoding: ros_image.encoding.clone(),
            width: ros_image.width,
            height: ros_image.height,
            expected: expected.max(h * row_len),
            actual: ros_image.data.len(),
        });
    }
    if step == row_len {
        return Ok(ros_image.data[..h * row_len].to_vec());
    }
    let mut packed = Vec::with_capacity(h * row_len);
    for row in 0..h {
        packed.extend_from_slice(&ros_image.data[row * step..row * step + row_len]);
    }
    Ok(packed)
}

fn shaped2<T>(values: Vec<T>, h: usize, w: usize) -> Result<Array2<T>, ExtractError> {
    let actual = values.len();
    Array2::from_shape_vec((h, w), values).map_err(|_| ExtractError::ImageSize {
        encoding: "gray".to_string(),
        width: w as u32,
        height: h as u32,
        expected: h * w,
        actual,
    })
}

fn shaped3(values: Vec<u8>, h: usize, w: usize, c: usize) -> Result<Array3<u8>, ExtractError> {
    let actual = values.len();
    Array3::from_shape_vec((h, w, c), values).map_err(|_| ExtractError::ImageSize {
        encoding: format!("{} channels", c),
        width: w as u32,
        height: h as u32,
        expected: h * w * c,
        actual,
    })
}

fn swap_red_blue(arr: &mut Array3<u8>) {
    for mut px in arr.rows_mut() {
        px.swap(0, 2);
    }
}
