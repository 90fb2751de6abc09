/// Polymorphic cover-image identifier (spec.md §9 "polymorphic image
/// targets"). Path derivation is a total function over the tag, replacing
/// the source's `{picture_path, cover_file_path}` fork-inconsistent fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageTarget {
    Album(i32),
    User(i32),
    Playlist(i32),
}

impl ImageTarget {
    /// The object key within the cover bucket (spec.md §6 "Blob layout").
    pub fn blob_key(&self) -> String {
        match self {
            ImageTarget::Album(id) => format!("albums/{id}"),
            ImageTarget::User(id) => format!("user/{id}"),
            ImageTarget::Playlist(id) => format!("playlist/{id}"),
        }
    }

    pub fn id(&self) -> i32 {
        match self {
            ImageTarget::Album(id) | ImageTarget::User(id) | ImageTarget::Playlist(id) => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_key_is_tag_prefixed() {
        assert_eq!(ImageTarget::Album(7).blob_key(), "albums/7");
        assert_eq!(ImageTarget::User(3).blob_key(), "user/3");
        assert_eq!(ImageTarget::Playlist(11).blob_key(), "playlist/11");
    }
}
