//! Static files embedded into every report: the institute logo and the
//! Thai font faces.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;

use crate::error::ReportError;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

pub const FONT_REGULAR: &str = "THSarabun.ttf";
pub const FONT_BOLD: &str = "THSarabun-Bold.ttf";
pub const FONT_ITALIC: &str = "THSarabun-Italic.ttf";
pub const FONT_BOLD_ITALIC: &str = "THSarabun-BoldItalic.ttf";

#[derive(Clone, Debug)]
pub struct Logo {
    data_uri: String,
}

impl Logo {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReportError> {
        let mime = if bytes.starts_with(PNG_MAGIC) {
            "image/png"
        } else if bytes.starts_with(JPEG_MAGIC) {
            "image/jpeg"
        } else {
            return Err(ReportError::Asset("logo is neither PNG nor JPEG".into()));
        };
        Ok(Self {
            data_uri: format!("data:{};base64,{}", mime, STANDARD.encode(bytes)),
        })
    }

    pub async fn load(path: &Path) -> Result<Self, ReportError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ReportError::Asset(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(&bytes)
    }

    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }
}

/// Bytes behind a `data:<mime>;base64,<payload>` URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, ReportError> {
    let payload = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .ok_or_else(|| ReportError::Asset("not a base64 data URI".into()))?;
    STANDARD
        .decode(payload)
        .map_err(|e| ReportError::Asset(format!("invalid base64 image: {}", e)))
}

/// Normal, bold, italic and bold-italic faces of one family.
#[derive(Clone, Debug)]
pub struct FontFaces {
    pub regular: Vec<u8>,
    pub bold: Vec<u8>,
    pub italic: Vec<u8>,
    pub bold_italic: Vec<u8>,
}

impl FontFaces {
    pub async fn load(dir: &Path) -> Result<Self, ReportError> {
        Ok(Self {
            regular: read_face(dir, FONT_REGULAR).await?,
            bold: read_face(dir, FONT_BOLD).await?,
            italic: read_face(dir, FONT_ITALIC).await?,
            bold_italic: read_face(dir, FONT_BOLD_ITALIC).await?,
        })
    }

    pub fn face(&self, bold: bool, italic: bool) -> &[u8] {
        match (bold, italic) {
            (false, false) => &self.regular,
            (true, false) => &self.bold,
            (false, true) => &self.italic,
            (true, true) => &self.bold_italic,
        }
    }
}

async fn read_face(dir: &Path, file: &str) -> Result<Vec<u8>, ReportError> {
    let path = dir.join(file);
    tokio::fs::read(&path)
        .await
        .map_err(|e| ReportError::Asset(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn png_logo_becomes_png_data_uri() {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.extend_from_slice(b"rest");
        let logo = Logo::from_bytes(&bytes).expect("png accepted");
        assert!(logo.data_uri().starts_with("data:image/png;base64,"));
        assert_eq!(decode_data_uri(logo.data_uri()).expect("decodes"), bytes);
    }

    #[test]
    fn unknown_image_format_is_rejected() {
        let err = Logo::from_bytes(b"GIF89a").unwrap_err();
        assert!(matches!(err, ReportError::Asset(_)));
    }

    #[test]
    fn malformed_data_uri_is_rejected() {
        assert!(decode_data_uri("image/png;base64,AAAA").is_err());
        assert!(decode_data_uri("data:image/png;base64,@@@").is_err());
    }

    #[tokio::test]
    async fn load_reads_logo_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(JPEG_MAGIC).expect("write");
        file.write_all(b"jpeg body").expect("write");

        let logo = Logo::load(file.path()).await.expect("loads");
        assert!(logo.data_uri().starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn missing_font_face_names_the_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join(FONT_REGULAR), b"ttf").expect("write");

        let err = FontFaces::load(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains(FONT_BOLD), "{}", err);
    }
}
