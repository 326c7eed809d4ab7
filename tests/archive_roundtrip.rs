use ndarray::{Array1, Array2, ArrayD};
use speechprep::archive::{ArchiveError, read_archive, write_archive};
use tempfile::TempDir;

#[test]
fn arrays_survive_bit_for_bit() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("clip.npz");
    let waveform = Array1::from(vec![0.0_f32, -0.0, 1.0, -1.0, f32::MIN_POSITIVE, 1e-30, 0.123_456_7]);
    let mfcc = Array2::from_shape_fn((13, 5), |(row, col)| row as f32 * 0.5 - col as f32 / 3.0);
    let empty = Array2::<f32>::zeros((12, 0));
    write_archive(
        &path,
        &[
            ("waveform", waveform.view().into_dyn()),
            ("mfcc", mfcc.view().into_dyn()),
            ("chroma", empty.view().into_dyn()),
        ],
    )
    .unwrap();

    let archive = read_archive(&path).unwrap();
    assert_eq!(archive.len(), 3);
    let bits = |array: &ArrayD<f32>| array.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
    let restored = archive.get("waveform").unwrap();
    assert_eq!(restored.shape(), [7]);
    assert_eq!(bits(restored), waveform.iter().map(|v| v.to_bits()).collect::<Vec<_>>());
    let restored = archive.get("mfcc").unwrap();
    assert_eq!(restored.shape(), [13, 5]);
    assert_eq!(bits(restored), mfcc.iter().map(|v| v.to_bits()).collect::<Vec<_>>());
    assert_eq!(archive.get("chroma").unwrap().shape(), [12, 0]);
}

#[test]
fn rewrite_replaces_previous_archive() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clip.npz");
    let first = Array1::from(vec![1.0_f32; 4]);
    let second = Array1::from(vec![2.0_f32; 2]);
    write_archive(&path, &[("rms", first.view().into_dyn())]).unwrap();
    write_archive(&path, &[("rms", second.view().into_dyn())]).unwrap();
    let archive = read_archive(&path).unwrap();
    assert_eq!(archive.get("rms").unwrap().shape(), [2]);
    let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[test]
fn non_archive_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fake.npz");
    std::fs::write(&path, b"definitely not a zip").unwrap();
    assert!(matches!(read_archive(&path), Err(ArchiveError::Zip { .. })));
}
