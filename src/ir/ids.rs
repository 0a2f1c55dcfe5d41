//! Newtype ids and the allocator that hands them out.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            #[inline]
            pub fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifies one converted image across the whole run.
    ImageId
);
define_id!(
    /// Identifies one object annotation across the whole run.
    AnnotationId
);
define_id!(
    /// A label-map class id. `background` is always 0.
    CategoryId
);

/// Sequential id source for one conversion run.
///
/// Image ids are never derived from file names: the training input pipeline
/// casts `source_id` through `f32`, and large integers such as `2008000002`
/// do not survive that round trip. Small sequential ids do.
///
/// Each counter starts at 1. A fresh allocator starts a fresh sequence, so
/// two runs in the same process do not share state.
#[derive(Clone, Debug, Default)]
pub struct IdAllocator {
    last_image: u64,
    last_annotation: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_image_id(&mut self) -> ImageId {
        self.last_image += 1;
        ImageId(self.last_image)
    }

    pub fn next_annotation_id(&mut self) -> AnnotationId {
        self.last_annotation += 1;
        AnnotationId(self.last_annotation)
    }
}
