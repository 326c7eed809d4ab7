//! NPY v1.0 encoding for little-endian `f32` arrays in C order.

use ndarray::{ArrayD, ArrayViewD, IxDyn};

const MAGIC: &[u8; 6] = b"\x93NUMPY";
const DESCR: &str = "<f4";
/// Header (magic through newline) is padded to a multiple of this.
const HEADER_ALIGN: usize = 64;
const PREAMBLE_LEN: usize = MAGIC.len() + 2 + 2;

/// Encode `array` as a complete `.npy` byte stream.
pub(crate) fn encode(array: &ArrayViewD<'_, f32>) -> Vec<u8> {
    let header = header_text(array.shape());
    let mut out = Vec::with_capacity(PREAMBLE_LEN + header.len() + array.len() * 4);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    out.extend_from_slice(header.as_bytes());
    // Logical iteration order is C order regardless of memory layout.
    for value in array.iter() {
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

fn header_text(shape: &[usize]) -> String {
    let dims = match shape {
        [] => "()".to_string(),
        [single] => format!("({single},)"),
        _ => {
            let joined: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
            format!("({})", joined.join(", "))
        }
    };
    let mut header = format!("{{'descr': '{DESCR}', 'fortran_order': False, 'shape': {dims}, }}");
    let unpadded = PREAMBLE_LEN + header.len() + 1;
    let padding = (HEADER_ALIGN - unpadded % HEADER_ALIGN) % HEADER_ALIGN;
    header.extend(std::iter::repeat_n(' ', padding));
    header.push('\n');
    header
}

/// Decode a `.npy` byte stream written by [`encode`].
pub(crate) fn decode(bytes: &[u8]) -> Result<ArrayD<f32>, String> {
    if bytes.len() < PREAMBLE_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err("missing NPY magic".into());
    }
    let (major, minor) = (bytes[6], bytes[7]);
    if (major, minor) != (1, 0) {
        return Err(format!("unsupported NPY version {major}.{minor}"));
    }
    let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
    let data_start = PREAMBLE_LEN + header_len;
    let header = bytes
        .get(PREAMBLE_LEN..data_start)
        .ok_or_else(|| "truncated NPY header".to_string())?;
    let header = std::str::from_utf8(header).map_err(|err| format!("header is not UTF-8: {err}"))?;
    if !header.contains(&format!("'descr': '{DESCR}'")) {
        return Err(format!("unsupported dtype in header {}", header.trim()));
    }
    if !header.contains("'fortran_order': False") {
        return Err("Fortran-ordered arrays are not supported".into());
    }
    let shape = parse_shape(header)?;
    let count: usize = shape.iter().product();
    let data = &bytes[data_start..];
    if data.len() != count * 4 {
        return Err(format!(
            "expected {} data bytes for shape {shape:?}, found {}",
            count * 4,
            data.len()
        ));
    }
    let values: Vec<f32> = data
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|err| err.to_string())
}

fn parse_shape(header: &str) -> Result<Vec<usize>, String> {
    let start = header
        .find("'shape': (")
        .map(|idx| idx + "'shape': (".len())
        .ok_or_else(|| "header has no shape".to_string())?;
    let end = header[start..]
        .find(')')
        .map(|idx| start + idx)
        .ok_or_else(|| "unterminated shape tuple".to_string())?;
    header[start..end]
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<usize>()
                .map_err(|err| format!("bad dimension '{part}': {err}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};

    #[test]
    fn header_is_aligned_and_newline_terminated() {
        let array = Array2::<f32>::zeros((13, 61));
        let bytes = encode(&array.view().into_dyn());
        let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        assert_eq!((PREAMBLE_LEN + header_len) % HEADER_ALIGN, 0);
        assert_eq!(bytes[PREAMBLE_LEN + header_len - 1], b'\n');
        let header = std::str::from_utf8(&bytes[PREAMBLE_LEN..PREAMBLE_LEN + header_len]).unwrap();
        assert!(header.starts_with("{'descr': '<f4', 'fortran_order': False, 'shape': (13, 61), }"));
    }

    #[test]
    fn one_dimensional_shape_has_trailing_comma() {
        assert!(header_text(&[5]).contains("'shape': (5,)"));
        assert!(header_text(&[]).contains("'shape': ()"));
    }

    #[test]
    fn decode_restores_values_and_shape() {
        let array = Array1::from(vec![0.5_f32, -1.25, f32::MIN_POSITIVE]).into_dyn();
        let decoded = decode(&encode(&array.view())).unwrap();
        assert_eq!(decoded, array);
    }

    #[test]
    fn truncated_data_is_rejected() {
        let array = Array2::<f32>::ones((2, 3)).into_dyn();
        let mut bytes = encode(&array.view());
        bytes.pop();
        assert!(decode(&bytes).is_err());
    }
}
