// Copyright (c) 2026 The texcopy developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Copies performed by the CPU on host-visible memory.

use crate::{copy::CopyRegionInfo, resource::Resource, DeviceSize};
use std::{ops::Range, ptr, sync::Arc};

/// The last-resort copy strategy. It handles every resource shape, including buffers, and never
/// declines.
pub trait SoftwareCopy {
    /// Copies the region described by `info`.
    fn copy_region(&mut self, info: &CopyRegionInfo);
}

/// A [`SoftwareCopy`] that copies the host-visible memory of the resources row by row.
///
/// Compressed formats are copied in whole texel blocks.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostCopy;

impl HostCopy {
    #[inline]
    pub fn new() -> Self {
        HostCopy
    }
}

/// The byte ranges of one row of texel blocks, in the source and in the destination.
struct RowCopy {
    src: Range<usize>,
    dst: usize,
}

fn row_copies(info: &CopyRegionInfo) -> Vec<RowCopy> {
    let src = &info.src_resource;
    let dst = &info.dst_resource;
    let [block_width, block_height, _] = src.texel_block_extent();
    let [width, height, depth] = info.src_box.extent.map(|x| x.max(0) as u32);
    let [src_x, src_y, src_z] = info.src_box.offset.map(|x| x.max(0) as u32);
    let [dst_x, dst_y, dst_z] = info.dst_offset;

    let row_size = width.div_ceil(block_width) as DeviceSize * src.texel_block_size();
    let rows = height.div_ceil(block_height);
    let mut copies = Vec::with_capacity((rows * depth) as usize);

    for slice in 0..depth {
        for row in 0..rows {
            let src_offset = src.texel_offset(
                info.src_level,
                [src_x, src_y + row * block_height, src_z + slice],
            );
            let dst_offset = dst.texel_offset(
                info.dst_level,
                [dst_x, dst_y + row * block_height, dst_z + slice],
            );

            copies.push(RowCopy {
                src: src_offset as usize..(src_offset + row_size) as usize,
                dst: dst_offset as usize,
            });
        }
    }

    copies
}

impl SoftwareCopy for HostCopy {
    fn copy_region(&mut self, info: &CopyRegionInfo) {
        let copies = row_copies(info);
        let bytes: usize = copies.iter().map(|copy| copy.src.len()).sum();

        if Arc::ptr_eq(&info.src_resource, &info.dst_resource) {
            let mut memory = info.src_resource.host_memory();

            for copy in copies {
                memory.copy_within(copy.src, copy.dst);
            }
        } else {
            let (src_memory, mut dst_memory) =
                lock_pair(&info.src_resource, &info.dst_resource);

            for copy in copies {
                let len = copy.src.len();
                dst_memory[copy.dst..copy.dst + len].copy_from_slice(&src_memory[copy.src]);
            }
        }

        tracing::trace!(bytes, "host copy");
    }
}

/// Locks the memory of both resources, in address order.
fn lock_pair<'a>(
    src: &'a Resource,
    dst: &'a Resource,
) -> (
    parking_lot::MutexGuard<'a, Vec<u8>>,
    parking_lot::MutexGuard<'a, Vec<u8>>,
) {
    if ptr::from_ref(src) < ptr::from_ref(dst) {
        let src_memory = src.host_memory();
        let dst_memory = dst.host_memory();
        (src_memory, dst_memory)
    } else {
        let dst_memory = dst.host_memory();
        let src_memory = src.host_memory();
        (src_memory, dst_memory)
    }
}

#[cfg(test)]
mod tests {
    use super::{HostCopy, SoftwareCopy};
    use crate::{
        copy::CopyRegionInfo,
        format::Format,
        resource::{ImageBox, Resource, ResourceCreateInfo, ResourceShape},
    };
    use std::sync::Arc;

    fn resource(shape: ResourceShape, format: Format) -> Arc<Resource> {
        Resource::new(ResourceCreateInfo::new(shape, format)).unwrap()
    }

    fn fill_pattern(resource: &Resource) {
        for (i, byte) in resource.host_memory().iter_mut().enumerate() {
            *byte = (i % 251) as u8;
        }
    }

    #[test]
    fn buffer_to_buffer() {
        let src = resource(ResourceShape::Buffer { size: 4096 }, Format::R8_UINT);
        let dst = resource(ResourceShape::Buffer { size: 4096 }, Format::R8_UINT);
        fill_pattern(&src);

        HostCopy.copy_region(&CopyRegionInfo::new(src.clone(), dst.clone()));

        assert_eq!(*src.host_memory(), *dst.host_memory());
    }

    #[test]
    fn sub_rectangle() {
        let src = resource(
            ResourceShape::Image2d { extent: [8, 8] },
            Format::R16_UINT,
        );
        let dst = resource(
            ResourceShape::Image2d { extent: [4, 4] },
            Format::R16_UINT,
        );
        fill_pattern(&src);

        let info = CopyRegionInfo {
            src_box: ImageBox::new([2, 3, 0], [3, 2, 1]),
            dst_offset: [1, 1, 0],
            ..CopyRegionInfo::new(src.clone(), dst.clone())
        };
        HostCopy.copy_region(&info);

        let src_memory = src.host_memory();
        let dst_memory = dst.host_memory();

        for row in 0..2 {
            let src_start = (3 + row) * 16 + 2 * 2;
            let dst_start = (1 + row) * 8 + 2;
            assert_eq!(
                dst_memory[dst_start..dst_start + 6],
                src_memory[src_start..src_start + 6],
            );
        }

        // Untouched texels stay zero.
        assert!(dst_memory[0..8].iter().all(|&b| b == 0));
        assert!(dst_memory[24..32].iter().all(|&b| b == 0));
    }

    #[test]
    fn array_layers_and_levels() {
        let src = Resource::new(ResourceCreateInfo {
            mip_levels: 2,
            ..ResourceCreateInfo::new(
                ResourceShape::Image2dArray {
                    extent: [4, 4],
                    array_layers: 3,
                },
                Format::R8_UNORM,
            )
        })
        .unwrap();
        let dst = resource(
            ResourceShape::Image2dArray {
                extent: [2, 2],
                array_layers: 2,
            },
            Format::R8_UNORM,
        );
        fill_pattern(&src);

        let info = CopyRegionInfo {
            src_level: 1,
            src_box: ImageBox::new([0, 0, 1], [2, 2, 2]),
            ..CopyRegionInfo::new(src.clone(), dst.clone())
        };
        HostCopy.copy_region(&info);

        let level1 = src.level_layout(1);
        let start = (level1.offset + level1.slice_pitch) as usize;
        assert_eq!(
            dst.host_memory()[..],
            src.host_memory()[start..start + 8],
        );
    }

    #[test]
    fn compressed_blocks() {
        let src = resource(
            ResourceShape::Image2d { extent: [8, 8] },
            Format::BC1_RGBA_UNORM_BLOCK,
        );
        let dst = resource(
            ResourceShape::Image2d { extent: [8, 8] },
            Format::BC1_RGBA_UNORM_BLOCK,
        );
        fill_pattern(&src);

        HostCopy.copy_region(&CopyRegionInfo {
            src_box: ImageBox::new([4, 0, 0], [4, 8, 1]),
            dst_offset: [0, 0, 0],
            ..CopyRegionInfo::new(src.clone(), dst.clone())
        });

        let src_memory = src.host_memory();
        let dst_memory = dst.host_memory();
        // Two block rows of 16 bytes; the right-hand block of each moves to the left.
        assert_eq!(dst_memory[0..8], src_memory[8..16]);
        assert_eq!(dst_memory[16..24], src_memory[24..32]);
        assert!(dst_memory[8..16].iter().all(|&b| b == 0));
    }

    #[test]
    fn within_one_resource() {
        let image = resource(
            ResourceShape::Image2dArray {
                extent: [4, 4],
                array_layers: 2,
            },
            Format::R8_UNORM,
        );
        fill_pattern(&image);
        let original = image.host_memory().clone();

        HostCopy.copy_region(&CopyRegionInfo {
            src_box: ImageBox::new([0, 0, 0], [4, 4, 1]),
            dst_offset: [0, 0, 1],
            ..CopyRegionInfo::new(image.clone(), image.clone())
        });

        let memory = image.host_memory();
        assert_eq!(memory[0..16], original[0..16]);
        assert_eq!(memory[16..32], original[0..16]);
    }
}
