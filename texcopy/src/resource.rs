// Copyright (c) 2026 The texcopy developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! GPU-resident images and linear buffers.
//!
//! A [`Resource`] is either a linear buffer or an image of some shape. Which copy strategies are
//! allowed to operate on a resource depends on its [`ResourceShape`]: buffers are byte-addressed
//! and cannot be bound as render targets, so the 3D-pipeline copy path declines them.
//!
//! Every resource carries host-visible backing memory laid out linearly, level after level.
//! Within a level, the slices (array layers, or depth slices for 3D images) are stored one after
//! the other, and each slice is a tightly packed sequence of rows of texel blocks. This is the
//! memory that the [software copy](crate::software::HostCopy) reads and writes.

use crate::{format::Format, view::ImageViewType, DeviceSize, ValidationError, NE};
use parking_lot::{Mutex, MutexGuard};
use std::{cmp::max, fmt, sync::Arc};

/// The shape of a resource, along with its dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceShape {
    /// A linear buffer of `size` bytes.
    Buffer { size: DeviceSize },

    /// A one-dimensional image.
    Image1d { width: u32 },

    /// An array of one-dimensional images.
    Image1dArray { width: u32, array_layers: u32 },

    /// A two-dimensional image.
    Image2d { extent: [u32; 2] },

    /// An array of two-dimensional images.
    Image2dArray { extent: [u32; 2], array_layers: u32 },

    /// A three-dimensional volume.
    Image3d { extent: [u32; 3] },

    /// A cube map, made of six square faces.
    Cube { extent: [u32; 2] },

    /// An array of cube maps. `array_layers` counts faces, so it is a multiple of 6.
    CubeArray { extent: [u32; 2], array_layers: u32 },
}

impl ResourceShape {
    /// Returns whether the resource is a linear buffer.
    #[inline]
    pub fn is_buffer(&self) -> bool {
        matches!(self, ResourceShape::Buffer { .. })
    }

    /// Returns whether the resource is a cube map or an array of cube maps.
    #[inline]
    pub fn is_cube(&self) -> bool {
        matches!(self, ResourceShape::Cube { .. } | ResourceShape::CubeArray { .. })
    }

    /// Returns the extent of the first mip level. For buffers, the width is the size in bytes.
    pub fn extent(&self) -> [u32; 3] {
        match *self {
            ResourceShape::Buffer { size } => [u32::try_from(size).unwrap_or(u32::MAX), 1, 1],
            ResourceShape::Image1d { width } | ResourceShape::Image1dArray { width, .. } => {
                [width, 1, 1]
            }
            ResourceShape::Image2d { extent }
            | ResourceShape::Image2dArray { extent, .. }
            | ResourceShape::Cube { extent }
            | ResourceShape::CubeArray { extent, .. } => [extent[0], extent[1], 1],
            ResourceShape::Image3d { extent } => extent,
        }
    }

    /// Returns the number of array layers. Cube maps count each face as a layer, and 3D volumes
    /// have a single layer.
    pub fn array_layers(&self) -> u32 {
        match *self {
            ResourceShape::Buffer { .. }
            | ResourceShape::Image1d { .. }
            | ResourceShape::Image2d { .. }
            | ResourceShape::Image3d { .. } => 1,
            ResourceShape::Cube { .. } => 6,
            ResourceShape::Image1dArray { array_layers, .. }
            | ResourceShape::Image2dArray { array_layers, .. }
            | ResourceShape::CubeArray { array_layers, .. } => array_layers,
        }
    }

    /// Returns the view type that presents the whole resource with its natural shape. Buffers are
    /// presented as one-dimensional images.
    pub fn view_type(&self) -> ImageViewType {
        match self {
            ResourceShape::Buffer { .. } | ResourceShape::Image1d { .. } => ImageViewType::Dim1d,
            ResourceShape::Image1dArray { .. } => ImageViewType::Dim1dArray,
            ResourceShape::Image2d { .. } => ImageViewType::Dim2d,
            ResourceShape::Image2dArray { .. } => ImageViewType::Dim2dArray,
            ResourceShape::Image3d { .. } => ImageViewType::Dim3d,
            ResourceShape::Cube { .. } => ImageViewType::Cube,
            ResourceShape::CubeArray { .. } => ImageViewType::CubeArray,
        }
    }
}

/// Parameters to create a new `Resource`.
#[derive(Clone, Debug)]
pub struct ResourceCreateInfo {
    /// The shape and dimensions of the resource.
    ///
    /// There is no default value.
    pub shape: ResourceShape,

    /// The format of the texels of the resource. Buffers are always addressed in bytes, whatever
    /// their format.
    ///
    /// There is no default value.
    pub format: Format,

    /// The number of mip levels. Buffers must have exactly one.
    ///
    /// The default value is `1`.
    pub mip_levels: u32,

    pub _ne: crate::NonExhaustive,
}

impl ResourceCreateInfo {
    /// Returns a `ResourceCreateInfo` with the specified `shape` and `format`.
    #[inline]
    pub fn new(shape: ResourceShape, format: Format) -> Self {
        Self {
            shape,
            format,
            mip_levels: 1,
            _ne: NE,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), Box<ValidationError>> {
        let &Self {
            shape,
            format: _,
            mip_levels,
            _ne: _,
        } = self;

        let extent = match shape {
            ResourceShape::Buffer { size } => {
                if size == 0 {
                    return Err(ValidationError::new("shape", "the buffer size is zero"));
                }

                if size > i32::MAX as DeviceSize {
                    return Err(ValidationError::new(
                        "shape",
                        "the buffer size does not fit in a signed 32-bit texel coordinate",
                    ));
                }

                if mip_levels != 1 {
                    return Err(ValidationError::new(
                        "mip_levels",
                        "buffers must have exactly one mip level",
                    ));
                }

                return Ok(());
            }
            ResourceShape::Cube { extent } | ResourceShape::CubeArray { extent, .. }
                if extent[0] != extent[1] =>
            {
                return Err(ValidationError::new(
                    "shape",
                    "the faces of a cube map must be square",
                ));
            }
            _ => shape.extent(),
        };

        if extent.contains(&0) {
            return Err(ValidationError::new("shape", "the extent has a zero dimension"));
        }

        if extent.iter().any(|&x| x > i32::MAX as u32) || shape.array_layers() > i32::MAX as u32 {
            return Err(ValidationError::new(
                "shape",
                "the extent does not fit in a signed 32-bit texel coordinate",
            ));
        }

        match shape {
            ResourceShape::Image1dArray { array_layers, .. }
            | ResourceShape::Image2dArray { array_layers, .. }
                if array_layers == 0 =>
            {
                return Err(ValidationError::new("shape", "`array_layers` is zero"));
            }
            ResourceShape::CubeArray { array_layers, .. }
                if array_layers == 0 || array_layers % 6 != 0 =>
            {
                return Err(ValidationError::new(
                    "shape",
                    "`array_layers` of a cube map array is not a nonzero multiple of 6",
                ));
            }
            _ => (),
        }

        if mip_levels == 0 {
            return Err(ValidationError::new("mip_levels", "is zero"));
        }

        if mip_levels > max_mip_levels(extent) {
            return Err(ValidationError::new(
                "mip_levels",
                "is greater than the number of mip levels the extent allows",
            ));
        }

        Ok(())
    }
}

/// Where a mip level lives in the backing memory of a resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LevelLayout {
    /// The byte offset of the level from the start of the memory.
    pub offset: DeviceSize,

    /// The number of bytes between two consecutive rows of texel blocks.
    pub row_pitch: DeviceSize,

    /// The number of bytes between two consecutive slices.
    pub slice_pitch: DeviceSize,

    /// The number of slices in the level: the depth for 3D volumes, the array layers otherwise.
    pub slices: u32,
}

impl LevelLayout {
    /// Returns the total size in bytes of the level.
    #[inline]
    pub fn size(&self) -> DeviceSize {
        self.slice_pitch * self.slices as DeviceSize
    }
}

/// An image or linear buffer living in device memory.
pub struct Resource {
    shape: ResourceShape,
    format: Format,
    mip_levels: u32,
    level_layouts: Vec<LevelLayout>,
    memory: Mutex<Vec<u8>>,
}

impl Resource {
    /// Creates a new `Resource` with zeroed backing memory.
    pub fn new(create_info: ResourceCreateInfo) -> Result<Arc<Resource>, Box<ValidationError>> {
        create_info
            .validate()
            .map_err(|err| err.add_context("create_info"))?;

        let ResourceCreateInfo {
            shape,
            format,
            mip_levels,
            _ne: _,
        } = create_info;

        let mut resource = Resource {
            shape,
            format,
            mip_levels,
            level_layouts: Vec::with_capacity(mip_levels as usize),
            memory: Mutex::new(Vec::new()),
        };

        let mut offset = 0;

        for level in 0..mip_levels {
            let extent = mip_level_extent(resource.extent(), level).unwrap_or([1; 3]);
            let [block_width, block_height, _] = resource.texel_block_extent();
            let row_pitch =
                extent[0].div_ceil(block_width) as DeviceSize * resource.texel_block_size();
            let slice_pitch = row_pitch * extent[1].div_ceil(block_height) as DeviceSize;
            let layout = LevelLayout {
                offset,
                row_pitch,
                slice_pitch,
                slices: resource.layer_count(level),
            };

            offset += layout.size();
            resource.level_layouts.push(layout);
        }

        *resource.memory.get_mut() = vec![0; offset as usize];

        Ok(Arc::new(resource))
    }

    /// Returns the shape of the resource.
    #[inline]
    pub fn shape(&self) -> &ResourceShape {
        &self.shape
    }

    /// Returns the native format of the resource.
    #[inline]
    pub fn format(&self) -> Format {
        self.format
    }

    #[inline]
    pub fn mip_levels(&self) -> u32 {
        self.mip_levels
    }

    /// Returns the extent of the first mip level.
    #[inline]
    pub fn extent(&self) -> [u32; 3] {
        self.shape.extent()
    }

    #[inline]
    pub fn array_layers(&self) -> u32 {
        self.shape.array_layers()
    }

    #[inline]
    pub fn is_buffer(&self) -> bool {
        self.shape.is_buffer()
    }

    /// Returns the format the texels are laid out with in memory. Buffers are addressed in bytes,
    /// so this is `R8_UINT` for them.
    #[inline]
    pub fn texel_format(&self) -> Format {
        if self.is_buffer() {
            Format::R8_UINT
        } else {
            self.format
        }
    }

    /// Returns the size in bytes of one texel block as stored in memory.
    #[inline]
    pub fn texel_block_size(&self) -> DeviceSize {
        self.texel_format().block_size()
    }

    /// Returns the dimensions in texels of one texel block as stored in memory.
    #[inline]
    pub fn texel_block_extent(&self) -> [u32; 3] {
        self.texel_format().block_extent()
    }

    /// Returns the extent of mip level `level`, or `None` if the resource has no such level.
    pub fn mip_level_extent(&self, level: u32) -> Option<[u32; 3]> {
        if level >= self.mip_levels {
            return None;
        }

        mip_level_extent(self.extent(), level)
    }

    /// Returns the number of slices in mip level `level`: the minified depth for 3D volumes, and
    /// the number of array layers for everything else.
    ///
    /// # Panics
    ///
    /// - Panics if `level` is not less than the number of mip levels.
    pub fn layer_count(&self, level: u32) -> u32 {
        assert!(level < self.mip_levels);

        match self.shape {
            ResourceShape::Image3d { extent } => max(1, extent[2] >> level),
            _ => self.array_layers(),
        }
    }

    /// Returns whether `region` covers mip level `level` exactly, from the origin to the full
    /// extent and across every slice.
    pub fn covers_whole_level(&self, level: u32, region: &ImageBox) -> bool {
        let Some(extent) = self.mip_level_extent(level) else {
            return false;
        };

        region.offset == [0; 3]
            && region.extent
                == [
                    extent[0] as i32,
                    extent[1] as i32,
                    self.layer_count(level) as i32,
                ]
    }

    /// Returns the memory layout of mip level `level`.
    ///
    /// # Panics
    ///
    /// - Panics if `level` is not less than the number of mip levels.
    #[inline]
    pub fn level_layout(&self, level: u32) -> LevelLayout {
        self.level_layouts[level as usize]
    }

    /// Returns the byte offset in memory of the texel block containing the texel at `offset`
    /// (x, y, slice) in mip level `level`.
    pub fn texel_offset(&self, level: u32, offset: [u32; 3]) -> DeviceSize {
        let layout = self.level_layout(level);
        let [block_width, block_height, _] = self.texel_block_extent();

        layout.offset
            + offset[2] as DeviceSize * layout.slice_pitch
            + (offset[1] / block_height) as DeviceSize * layout.row_pitch
            + (offset[0] / block_width) as DeviceSize * self.texel_block_size()
    }

    /// Locks the host-visible backing memory of the resource.
    #[inline]
    pub fn host_memory(&self) -> MutexGuard<'_, Vec<u8>> {
        self.memory.lock()
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("shape", &self.shape)
            .field("format", &self.format)
            .field("mip_levels", &self.mip_levels)
            .finish_non_exhaustive()
    }
}

/// A box of texels: an offset and a signed extent. A negative extent selects texels on the
/// negative side of the offset, which is how blits express flipping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ImageBox {
    pub offset: [i32; 3],
    pub extent: [i32; 3],
}

impl ImageBox {
    #[inline]
    pub const fn new(offset: [i32; 3], extent: [i32; 3]) -> Self {
        ImageBox { offset, extent }
    }

    /// Returns a box covering `extent` texels from the origin.
    #[inline]
    pub fn from_extent(extent: [u32; 3]) -> Self {
        ImageBox {
            offset: [0; 3],
            extent: extent.map(|x| x as i32),
        }
    }

    /// Returns whether any of the dimensions is negative.
    #[inline]
    pub fn is_flipped(&self) -> bool {
        self.extent.iter().any(|&x| x < 0)
    }

    /// Returns the lowest and one-past-the-highest coordinate on each axis.
    pub fn bounds(&self) -> ([i64; 3], [i64; 3]) {
        let mut min = [0; 3];
        let mut max = [0; 3];

        for axis in 0..3 {
            let start = self.offset[axis] as i64;
            let end = start + self.extent[axis] as i64;
            min[axis] = start.min(end);
            max[axis] = start.max(end);
        }

        (min, max)
    }

    /// Returns whether the box lies entirely inside `[0, extent)` on every axis.
    pub fn fits_within(&self, extent: [u32; 3]) -> bool {
        let (min, max) = self.bounds();

        (0..3).all(|axis| min[axis] >= 0 && max[axis] <= extent[axis] as i64)
    }
}

/// Returns the maximum number of mipmap levels for the given image extent.
///
/// The returned value is always at least 1.
///
/// # Examples
///
/// ```
/// use texcopy::resource::max_mip_levels;
///
/// assert_eq!(max_mip_levels([32, 50, 1]), 6);
/// assert_eq!(max_mip_levels([1, 1, 1]), 1);
/// ```
#[inline]
pub fn max_mip_levels(extent: [u32; 3]) -> u32 {
    // This calculates `floor(log2(max(width, height, depth))) + 1` using fast integer operations.
    32 - (extent[0] | extent[1] | extent[2]).leading_zeros()
}

/// Returns the extent of the `level`th mipmap level.
/// If `level` is 0, then it returns `extent` back unchanged.
///
/// Returns `None` if `level` is not less than `max_mip_levels(extent)`.
///
/// # Examples
///
/// ```
/// use texcopy::resource::mip_level_extent;
///
/// let extent = [128, 48, 8];
///
/// assert_eq!(mip_level_extent(extent, 0), Some(extent));
/// assert_eq!(mip_level_extent(extent, 1), Some([64, 24, 4]));
/// assert_eq!(mip_level_extent(extent, 5), Some([4, 1, 1]));
/// assert_eq!(mip_level_extent(extent, 7), Some([1, 1, 1]));
/// assert_eq!(mip_level_extent(extent, 8), None);
/// ```
pub fn mip_level_extent(extent: [u32; 3], level: u32) -> Option<[u32; 3]> {
    if level == 0 {
        return Some(extent);
    }

    if level >= max_mip_levels(extent) {
        return None;
    }

    Some(extent.map(|x| {
        debug_assert!(x != 0);
        max(1, x >> level)
    }))
}

#[cfg(test)]
mod tests {
    use super::{ImageBox, Resource, ResourceCreateInfo, ResourceShape};
    use crate::format::Format;

    #[test]
    fn create_rejects_bad_shapes() {
        let err = Resource::new(ResourceCreateInfo::new(
            ResourceShape::Cube { extent: [16, 8] },
            Format::R8G8B8A8_UNORM,
        ))
        .unwrap_err();
        assert_eq!(err.context, "create_info.shape");

        assert!(Resource::new(ResourceCreateInfo::new(
            ResourceShape::CubeArray {
                extent: [16, 16],
                array_layers: 8,
            },
            Format::R8G8B8A8_UNORM,
        ))
        .is_err());

        assert!(Resource::new(ResourceCreateInfo {
            mip_levels: 2,
            ..ResourceCreateInfo::new(ResourceShape::Buffer { size: 64 }, Format::R8_UNORM)
        })
        .is_err());

        let err = Resource::new(ResourceCreateInfo::new(
            ResourceShape::Buffer {
                size: i32::MAX as u64 + 1,
            },
            Format::R8_UINT,
        ))
        .unwrap_err();
        assert_eq!(err.context, "create_info.shape");

        let err = Resource::new(ResourceCreateInfo::new(
            ResourceShape::Image2d {
                extent: [1 << 31, 1],
            },
            Format::R8_UINT,
        ))
        .unwrap_err();
        assert_eq!(err.context, "create_info.shape");

        let err = Resource::new(ResourceCreateInfo {
            mip_levels: 9,
            ..ResourceCreateInfo::new(
                ResourceShape::Image2d { extent: [128, 128] },
                Format::R8G8B8A8_UNORM,
            )
        })
        .unwrap_err();
        assert_eq!(err.context, "create_info.mip_levels");
    }

    #[test]
    fn layer_count_follows_shape() {
        let volume = Resource::new(ResourceCreateInfo {
            mip_levels: 3,
            ..ResourceCreateInfo::new(
                ResourceShape::Image3d {
                    extent: [16, 16, 8],
                },
                Format::R8_UNORM,
            )
        })
        .unwrap();
        assert_eq!(volume.layer_count(0), 8);
        assert_eq!(volume.layer_count(2), 2);

        let cubes = Resource::new(ResourceCreateInfo::new(
            ResourceShape::CubeArray {
                extent: [8, 8],
                array_layers: 12,
            },
            Format::R8_UNORM,
        ))
        .unwrap();
        assert_eq!(cubes.layer_count(0), 12);
        assert_eq!(cubes.extent(), [8, 8, 1]);
    }

    #[test]
    fn covers_whole_level() {
        let image = Resource::new(ResourceCreateInfo {
            mip_levels: 2,
            ..ResourceCreateInfo::new(
                ResourceShape::Image2d { extent: [64, 32] },
                Format::R8G8B8A8_UNORM,
            )
        })
        .unwrap();

        assert!(image.covers_whole_level(0, &ImageBox::new([0; 3], [64, 32, 1])));
        assert!(image.covers_whole_level(1, &ImageBox::new([0; 3], [32, 16, 1])));
        assert!(!image.covers_whole_level(1, &ImageBox::new([0; 3], [64, 32, 1])));
        assert!(!image.covers_whole_level(0, &ImageBox::new([1, 0, 0], [64, 32, 1])));
        assert!(!image.covers_whole_level(0, &ImageBox::new([0; 3], [64, 31, 1])));
        assert!(!image.covers_whole_level(2, &ImageBox::new([0; 3], [16, 8, 1])));
    }

    #[test]
    fn level_layout_is_packed() {
        let image = Resource::new(ResourceCreateInfo {
            mip_levels: 3,
            ..ResourceCreateInfo::new(
                ResourceShape::Image2dArray {
                    extent: [8, 4],
                    array_layers: 2,
                },
                Format::R16_UINT,
            )
        })
        .unwrap();

        let level0 = image.level_layout(0);
        assert_eq!(level0.offset, 0);
        assert_eq!(level0.row_pitch, 16);
        assert_eq!(level0.slice_pitch, 64);
        assert_eq!(level0.slices, 2);

        let level1 = image.level_layout(1);
        assert_eq!(level1.offset, 128);
        assert_eq!(level1.row_pitch, 8);

        let level2 = image.level_layout(2);
        assert_eq!(level2.offset, 128 + 32);
        assert_eq!(image.host_memory().len() as u64, 128 + 32 + 2 * 2 * 1 * 2);

        assert_eq!(image.texel_offset(1, [3, 1, 1]), 128 + 16 + 8 + 6);
    }

    #[test]
    fn compressed_layout_rounds_up_to_blocks() {
        let image = Resource::new(ResourceCreateInfo::new(
            ResourceShape::Image2d { extent: [10, 6] },
            Format::BC1_RGBA_UNORM_BLOCK,
        ))
        .unwrap();

        let layout = image.level_layout(0);
        assert_eq!(layout.row_pitch, 3 * 8);
        assert_eq!(layout.slice_pitch, 2 * 3 * 8);
        assert_eq!(image.texel_offset(0, [4, 4, 0]), 24 + 8);
    }

    #[test]
    fn buffers_are_byte_addressed() {
        let buffer = Resource::new(ResourceCreateInfo::new(
            ResourceShape::Buffer { size: 4096 },
            Format::R32_UINT,
        ))
        .unwrap();

        assert_eq!(buffer.extent(), [4096, 1, 1]);
        assert_eq!(buffer.texel_format(), Format::R8_UINT);
        assert_eq!(buffer.texel_block_size(), 1);
        assert_eq!(buffer.host_memory().len(), 4096);
        assert!(buffer.covers_whole_level(0, &ImageBox::new([0; 3], [4096, 1, 1])));
    }

    #[test]
    fn box_bounds() {
        let flipped = ImageBox::new([10, 0, 0], [-10, 4, 1]);
        assert!(flipped.is_flipped());
        assert_eq!(flipped.bounds(), ([0, 0, 0], [10, 4, 1]));
        assert!(flipped.fits_within([10, 4, 1]));
        assert!(!ImageBox::new([1, 0, 0], [10, 4, 1]).fits_within([10, 4, 1]));
        assert!(!ImageBox::new([-1, 0, 0], [2, 1, 1]).fits_within([10, 4, 1]));
    }
}
