//! HTTP download, checksum verification and archive extraction used by
//! the fetch workflow.

use std::fs;
use std::io::Write;
use std::path::Path;

use reqwest::Client;
use sha2::{Digest, Sha256};

use crate::utils::error::{FlowError, Result};

/// Downloads `url` into `dest`, creating parent directories as needed.
/// The body is streamed to disk chunk by chunk; bundle archives can run
/// into the hundreds of megabytes.
pub async fn download_file(client: &Client, url: &str, dest: &Path) -> Result<()> {
    tracing::debug!("GET {}", url);
    let mut response = client.get(url).send().await?.error_for_status()?;

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(dest)?;
    let mut written: u64 = 0;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk)?;
        written += chunk.len() as u64;
    }

    tracing::debug!("Wrote {} bytes to {}", written, dest.display());
    Ok(())
}

/// Lowercase hex SHA-256 of a byte slice.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Compares the file's SHA-256 digest against `expected` (hex, case-insensitive).
pub fn verify_sha256(path: &Path, expected: &str) -> Result<()> {
    let bytes = fs::read(path)?;
    let actual = sha256_hex(&bytes);
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(FlowError::ChecksumMismatch {
            file: path.display().to_string(),
            expected: expected.to_lowercase(),
            actual,
        })
    }
}

/// Extracts a zip archive into `dest`. Entries escaping the destination
/// directory are skipped.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(rel) = entry.enclosed_name() else {
            tracing::warn!("Skipping unsafe archive entry: {}", entry.name());
            continue;
        };
        let out_path = dest.join(rel);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&out_path)?;
        std::io::copy(&mut entry, &mut out)?;
    }

    tracing::debug!(
        "Extracted {} into {}",
        archive_path.display(),
        dest.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::{FileOptions, ZipWriter};

    #[test]
    fn sha256_hex_matches_known_digest() {
        // sha256("abc")
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn verify_sha256_detects_mismatch() {
        let dir = std::env::temp_dir();
        let path = dir.join("dwiflow_checksum_test.bin");
        fs::write(&path, b"abc").unwrap();

        assert!(verify_sha256(
            &path,
            "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD"
        )
        .is_ok());

        let err = verify_sha256(&path, "00ff").unwrap_err();
        assert!(matches!(err, FlowError::ChecksumMismatch { .. }));

        fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn streams_body_to_disk_intact() {
        use httpmock::prelude::*;

        let server = MockServer::start();
        // Large enough that the body arrives in more than one chunk.
        let payload: Vec<u8> = (0..1_048_576u32).map(|i| (i % 251) as u8).collect();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/big.bin");
            then.status(200).body(payload.clone());
        });

        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("big.bin");
        download_file(&reqwest::Client::new(), &server.url("/big.bin"), &dest)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(fs::read(&dest).unwrap(), payload);
    }

    #[test]
    fn extracts_nested_zip_entries() {
        let dir = tempfile::TempDir::new().unwrap();

        let zip_bytes = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            zip.start_file::<_, ()>("readme.txt", FileOptions::default())
                .unwrap();
            zip.write_all(b"hello").unwrap();
            zip.start_file::<_, ()>("sub/data.txt", FileOptions::default())
                .unwrap();
            zip.write_all(b"nested").unwrap();
            zip.finish().unwrap().into_inner()
        };

        let archive = dir.path().join("bundle.zip");
        fs::write(&archive, &zip_bytes).unwrap();

        extract_zip(&archive, dir.path()).unwrap();

        assert_eq!(fs::read(dir.path().join("readme.txt")).unwrap(), b"hello");
        assert_eq!(
            fs::read(dir.path().join("sub/data.txt")).unwrap(),
            b"nested"
        );
    }
}
