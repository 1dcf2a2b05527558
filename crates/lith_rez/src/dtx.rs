//! Version field fix-up for DTX textures.
//!
//! DTX headers written by older tools carry the texture version at offset 8 instead of
//! offset 4. When the byte at offset 4 is not one of the known versions, the 4-byte fields
//! at offsets 4 and 8 are swapped so the version ends up where current tools expect it.

/// Extension of DTX texture resources, compared case-insensitively
pub const DTX_EXTENSION: &str = "dtx";

/// Known DTX versions (LithTech 1.0, 1.5 and 2.0), as stored in the low byte
pub const KNOWN_VERSIONS: [i8; 3] = [-2, -3, -5];

const VERSION_OFFSET: usize = 4;
const SWAP_OFFSET: usize = 8;
const FIELD_SIZE: usize = 4;

/// Whether a resource with this extension is a DTX texture
pub fn is_dtx(extension: &str) -> bool {
    extension.eq_ignore_ascii_case(DTX_EXTENSION)
}

/// Whether the first chunk of a DTX payload has its version field misplaced.
///
/// Chunks too short to hold both fields are never patched.
pub fn needs_version_swap(chunk: &[u8]) -> bool {
    chunk.len() >= SWAP_OFFSET + FIELD_SIZE
        && !KNOWN_VERSIONS.contains(&(chunk[VERSION_OFFSET] as i8))
}

/// Swap the fields at offsets 4 and 8 when [`needs_version_swap`] holds.
///
/// Returns whether the chunk was modified.
pub fn patch_version_field(chunk: &mut [u8]) -> bool {
    if !needs_version_swap(chunk) {
        return false;
    }

    let fields = &mut chunk[VERSION_OFFSET..SWAP_OFFSET + FIELD_SIZE];
    let (version, swap) = fields.split_at_mut(FIELD_SIZE);
    version.swap_with_slice(swap);
    true
}
