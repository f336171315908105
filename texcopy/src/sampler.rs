// Copyright (c) 2026 The texcopy developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! How texels are read from a sampled view.

use crate::macros::vulkan_enum;

vulkan_enum! {
    /// Describes how the color of each pixel should be determined when the source region and the
    /// destination region of a blit have different sizes.
    #[non_exhaustive]
    Filter = Filter(i32);

    /// The pixel whose center is nearest to the requested coordinates is taken.
    ///
    /// Copies always use this filter, so that texels are transferred exactly.
    Nearest = NEAREST,

    /// The four pixels whose center surround the requested coordinates are taken, then their
    /// values are interpolated.
    Linear = LINEAR,
}

impl Default for Filter {
    #[inline]
    fn default() -> Self {
        Filter::Nearest
    }
}

vulkan_enum! {
    /// Describes the value that an individual component must return when being accessed.
    #[non_exhaustive]
    ComponentSwizzle = ComponentSwizzle(i32);

    /// Returns the value that this component should normally have.
    ///
    /// This is the `Default` value.
    Identity = IDENTITY,

    /// Always return zero.
    Zero = ZERO,

    /// Always return one.
    One = ONE,

    /// Returns the value of the first component.
    Red = R,

    /// Returns the value of the second component.
    Green = G,

    /// Returns the value of the third component.
    Blue = B,

    /// Returns the value of the fourth component.
    Alpha = A,
}

impl Default for ComponentSwizzle {
    #[inline]
    fn default() -> ComponentSwizzle {
        ComponentSwizzle::Identity
    }
}

/// Specifies how the components of a sampled view should be swizzled when read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ComponentMapping {
    /// First component.
    pub r: ComponentSwizzle,
    /// Second component.
    pub g: ComponentSwizzle,
    /// Third component.
    pub b: ComponentSwizzle,
    /// Fourth component.
    pub a: ComponentSwizzle,
}

impl ComponentMapping {
    /// Creates a `ComponentMapping` with all components identity swizzled.
    #[inline]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Returns `true` if all components are identity swizzled, meaning that all the members are
    /// `Identity` or the name of that member.
    ///
    /// Certain operations require views that are identity swizzled, and will return an error
    /// otherwise.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.r_is_identity() && self.g_is_identity() && self.b_is_identity() && self.a_is_identity()
    }

    #[inline]
    pub fn r_is_identity(&self) -> bool {
        matches!(self.r, ComponentSwizzle::Identity | ComponentSwizzle::Red)
    }

    #[inline]
    pub fn g_is_identity(&self) -> bool {
        matches!(self.g, ComponentSwizzle::Identity | ComponentSwizzle::Green)
    }

    #[inline]
    pub fn b_is_identity(&self) -> bool {
        matches!(self.b, ComponentSwizzle::Identity | ComponentSwizzle::Blue)
    }

    #[inline]
    pub fn a_is_identity(&self) -> bool {
        matches!(self.a, ComponentSwizzle::Identity | ComponentSwizzle::Alpha)
    }

    /// Returns the components after swizzling, as an array, in the order r, g, b, a.
    #[inline]
    pub fn component_array(&self) -> [ComponentSwizzle; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<ComponentMapping> for ash::vk::ComponentMapping {
    #[inline]
    fn from(value: ComponentMapping) -> Self {
        Self {
            r: value.r.into(),
            g: value.g.into(),
            b: value.b.into(),
            a: value.a.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ComponentMapping, ComponentSwizzle, Filter};

    #[test]
    fn identity_mapping() {
        let mapping = ComponentMapping::identity();
        assert!(mapping.is_identity());
        assert_eq!(mapping.component_array(), [ComponentSwizzle::Identity; 4]);

        let explicit = ComponentMapping {
            r: ComponentSwizzle::Red,
            g: ComponentSwizzle::Green,
            b: ComponentSwizzle::Blue,
            a: ComponentSwizzle::Alpha,
        };
        assert!(explicit.is_identity());

        let swapped = ComponentMapping {
            r: ComponentSwizzle::Blue,
            b: ComponentSwizzle::Red,
            ..ComponentMapping::identity()
        };
        assert!(!swapped.is_identity());
        assert!(swapped.g_is_identity());
    }

    #[test]
    fn ash_conversion() {
        let raw: ash::vk::ComponentMapping = ComponentMapping {
            a: ComponentSwizzle::One,
            ..ComponentMapping::identity()
        }
        .into();

        assert_eq!(raw.r, ash::vk::ComponentSwizzle::IDENTITY);
        assert_eq!(raw.a, ash::vk::ComponentSwizzle::ONE);
        assert_eq!(ash::vk::Filter::from(Filter::default()), ash::vk::Filter::NEAREST);
    }
}
