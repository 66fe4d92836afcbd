// src/utils/gdal_ext.rs
use gdal::raster::{Buffer, GdalDataType, GdalType, RasterBand};

use crate::error::{NbrError, Result};

/// A GDAL buffer tagged with its sample type.
///
/// Shapes follow GDAL's `(width, height)` ordering.
#[derive(Debug, Clone)]
pub enum TypedBuffer {
    U8(Buffer<u8>),
    U16(Buffer<u16>),
    I16(Buffer<i16>),
    I32(Buffer<i32>),
    F32(Buffer<f32>),
}

impl TypedBuffer {
    /// Read a whole band using its native sample type
    pub fn read_band(band: &RasterBand) -> Result<Self> {
        let size = band.size();
        let buffer = match band.band_type() {
            GdalDataType::UInt8 => TypedBuffer::U8(band.read_as::<u8>((0, 0), size, size, None)?),
            GdalDataType::UInt16 => {
                TypedBuffer::U16(band.read_as::<u16>((0, 0), size, size, None)?)
            }
            GdalDataType::Int16 => TypedBuffer::I16(band.read_as::<i16>((0, 0), size, size, None)?),
            GdalDataType::Int32 => TypedBuffer::I32(band.read_as::<i32>((0, 0), size, size, None)?),
            GdalDataType::Float32 => {
                TypedBuffer::F32(band.read_as::<f32>((0, 0), size, size, None)?)
            }
            other => return Err(NbrError::UnsupportedDataType(format!("{other:?}"))),
        };
        Ok(buffer)
    }

    pub fn shape(&self) -> (usize, usize) {
        match self {
            TypedBuffer::U8(b) => b.shape(),
            TypedBuffer::U16(b) => b.shape(),
            TypedBuffer::I16(b) => b.shape(),
            TypedBuffer::I32(b) => b.shape(),
            TypedBuffer::F32(b) => b.shape(),
        }
    }

    pub fn data_type(&self) -> GdalDataType {
        match self {
            TypedBuffer::U8(_) => GdalDataType::UInt8,
            TypedBuffer::U16(_) => GdalDataType::UInt16,
            TypedBuffer::I16(_) => GdalDataType::Int16,
            TypedBuffer::I32(_) => GdalDataType::Int32,
            TypedBuffer::F32(_) => GdalDataType::Float32,
        }
    }

    pub fn is_integer(&self) -> bool {
        !matches!(self, TypedBuffer::F32(_))
    }

    pub fn as_f32(&self) -> Option<&Buffer<f32>> {
        match self {
            TypedBuffer::F32(b) => Some(b),
            _ => None,
        }
    }

    /// Widen integer samples to `i64`. Returns `None` for float buffers.
    pub fn widen_to_i64(&self) -> Option<Vec<i64>> {
        match self {
            TypedBuffer::U8(b) => Some(b.data().iter().map(|&v| i64::from(v)).collect()),
            TypedBuffer::U16(b) => Some(b.data().iter().map(|&v| i64::from(v)).collect()),
            TypedBuffer::I16(b) => Some(b.data().iter().map(|&v| i64::from(v)).collect()),
            TypedBuffer::I32(b) => Some(b.data().iter().map(|&v| i64::from(v)).collect()),
            TypedBuffer::F32(_) => None,
        }
    }

    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            TypedBuffer::U8(b) => b.data().iter().map(|&v| f64::from(v)).collect(),
            TypedBuffer::U16(b) => b.data().iter().map(|&v| f64::from(v)).collect(),
            TypedBuffer::I16(b) => b.data().iter().map(|&v| f64::from(v)).collect(),
            TypedBuffer::I32(b) => b.data().iter().map(|&v| f64::from(v)).collect(),
            TypedBuffer::F32(b) => b.data().iter().map(|&v| f64::from(v)).collect(),
        }
    }

    /// Build a new buffer of `shape` whose n-th sample is `self[source(n)]`,
    /// keeping the sample type.
    pub fn remap(&self, shape: (usize, usize), source: impl Fn(usize) -> usize) -> Self {
        match self {
            TypedBuffer::U8(b) => TypedBuffer::U8(remap_buffer(b, shape, &source)),
            TypedBuffer::U16(b) => TypedBuffer::U16(remap_buffer(b, shape, &source)),
            TypedBuffer::I16(b) => TypedBuffer::I16(remap_buffer(b, shape, &source)),
            TypedBuffer::I32(b) => TypedBuffer::I32(remap_buffer(b, shape, &source)),
            TypedBuffer::F32(b) => TypedBuffer::F32(remap_buffer(b, shape, &source)),
        }
    }
}

fn remap_buffer<T: Copy + GdalType>(
    buffer: &Buffer<T>,
    shape: (usize, usize),
    source: &impl Fn(usize) -> usize,
) -> Buffer<T> {
    let src = buffer.data();
    let data = (0..shape.0 * shape.1).map(|n| src[source(n)]).collect();
    Buffer::new(shape, data)
}
