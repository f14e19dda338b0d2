// SPDX-License-Identifier: GPL-3.0-only

//! Pixel format to luma-plane conversion
//!
//! Capture devices deliver frames in whatever format they negotiate; the
//! sampler only ever looks at the luminance channel. These helpers extract
//! a tightly packed luma plane from the formats the V4L2 source accepts.

/// Extract the luma plane for a FourCC, or `None` for unsupported formats.
pub fn extract_luma(fourcc: &[u8; 4], data: &[u8]) -> Option<Vec<u8>> {
    match fourcc {
        b"GREY" => Some(data.to_vec()),
        b"YUYV" => Some(yuyv_to_luma(data)),
        b"UYVY" => Some(uyvy_to_luma(data)),
        b"RGB3" => Some(rgb24_to_luma(data)),
        _ => None,
    }
}

/// Check whether a FourCC can be converted to a luma plane
pub fn is_supported(fourcc: &[u8; 4]) -> bool {
    matches!(fourcc, b"GREY" | b"YUYV" | b"UYVY" | b"RGB3")
}

/// Extract luma from YUYV (YUV 4:2:2)
///
/// YUYV format: Y0 U0 Y1 V0 - each 4-byte group encodes 2 pixels.
pub fn yuyv_to_luma(data: &[u8]) -> Vec<u8> {
    let mut luma = Vec::with_capacity(data.len() / 2);
    for chunk in data.chunks_exact(4) {
        luma.push(chunk[0]);
        luma.push(chunk[2]);
    }
    luma
}

/// Extract luma from UYVY (YUV 4:2:2)
///
/// UYVY format: U0 Y0 V0 Y1 - each 4-byte group encodes 2 pixels.
pub fn uyvy_to_luma(data: &[u8]) -> Vec<u8> {
    let mut luma = Vec::with_capacity(data.len() / 2);
    for chunk in data.chunks_exact(4) {
        luma.push(chunk[1]);
        luma.push(chunk[3]);
    }
    luma
}

/// Convert RGB24 to luma using BT.601 coefficients
pub fn rgb24_to_luma(data: &[u8]) -> Vec<u8> {
    let mut luma = Vec::with_capacity(data.len() / 3);
    for chunk in data.chunks_exact(3) {
        let r = chunk[0] as f32;
        let g = chunk[1] as f32;
        let b = chunk[2] as f32;
        let y = (0.299 * r + 0.587 * g + 0.114 * b).clamp(0.0, 255.0);
        luma.push(y as u8);
    }
    luma
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yuyv_extracts_y_bytes() {
        // Two pixel pairs: Y values 10, 20, 30, 40 with dummy chroma
        let data = [10, 128, 20, 128, 30, 64, 40, 192];
        assert_eq!(yuyv_to_luma(&data), vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_uyvy_extracts_y_bytes() {
        let data = [128, 10, 128, 20, 64, 30, 192, 40];
        assert_eq!(uyvy_to_luma(&data), vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_yuyv_ignores_trailing_partial_group() {
        let data = [10, 128, 20, 128, 30, 64];
        assert_eq!(yuyv_to_luma(&data), vec![10, 20]);
    }

    #[test]
    fn test_rgb24_luma_extremes() {
        let black_white = [0, 0, 0, 255, 255, 255];
        let luma = rgb24_to_luma(&black_white);
        assert_eq!(luma[0], 0);
        // 0.299 + 0.587 + 0.114 = 1.0, truncation may lose at most one step
        assert!(luma[1] >= 254);
    }

    #[test]
    fn test_rgb24_green_dominates() {
        let red = rgb24_to_luma(&[255, 0, 0]);
        let green = rgb24_to_luma(&[0, 255, 0]);
        let blue = rgb24_to_luma(&[0, 0, 255]);
        assert!(green[0] > red[0]);
        assert!(red[0] > blue[0]);
    }

    #[test]
    fn test_extract_luma_dispatch() {
        assert_eq!(extract_luma(b"GREY", &[1, 2, 3]), Some(vec![1, 2, 3]));
        assert_eq!(extract_luma(b"YUYV", &[9, 0, 9, 0]), Some(vec![9, 9]));
        assert_eq!(extract_luma(b"MJPG", &[1, 2, 3]), None);
        assert!(is_supported(b"RGB3"));
        assert!(!is_supported(b"MJPG"));
    }
}
