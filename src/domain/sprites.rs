// Sprite utilities: slicing one composite image into indexed sub-image
// renderers, and the numbered-path helper for frame sequences stored as
// individual files.

use crate::domain::layers::Rect;
use crate::domain::ports::{Canvas, ImageHandle};

/// One rectangular slice of a larger sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteSlice {
    pub image: ImageHandle,
    pub src: Rect,
}

impl SpriteSlice {
    pub fn render(&self, canvas: &mut dyn Canvas, dst: Rect) {
        canvas.draw_image(self.image, self.src, dst);
    }
}

/// Slices a composite image into `count` frames laid out left-to-right,
/// top-to-bottom, `cols` frames per row. One load per call; the sequence is
/// finite and not restartable.
pub fn slice_sheet(
    image: ImageHandle,
    count: usize,
    frame_w: f32,
    frame_h: f32,
    cols: usize,
) -> Vec<SpriteSlice> {
    (0..count)
        .map(|i| {
            let x = (i % cols) as f32 * frame_w;
            let y = (i / cols) as f32 * frame_h;
            SpriteSlice {
                image,
                src: Rect::new(x, y, frame_w, frame_h),
            }
        })
        .collect()
}

/// Builds the file names of a numbered image sequence:
/// `prefix` + zero-padded index (`digits` wide) + `ext`.
pub fn numbered_frame_paths(
    first: usize,
    count: usize,
    digits: usize,
    prefix: &str,
    ext: &str,
) -> Vec<String> {
    (0..count)
        .map(|i| format!("{prefix}{:0width$}{ext}", first + i, width = digits))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_walk_rows_left_to_right() {
        let slices = slice_sheet(ImageHandle(1), 5, 128.0, 128.0, 3);
        assert_eq!(slices.len(), 5);
        assert_eq!(slices[0].src, Rect::new(0.0, 0.0, 128.0, 128.0));
        assert_eq!(slices[2].src, Rect::new(256.0, 0.0, 128.0, 128.0));
        // Fourth frame wraps to the second row.
        assert_eq!(slices[3].src, Rect::new(0.0, 128.0, 128.0, 128.0));
        assert_eq!(slices[4].src, Rect::new(128.0, 128.0, 128.0, 128.0));
    }

    #[test]
    fn numbered_paths_are_zero_padded() {
        let paths = numbered_frame_paths(0, 3, 4, "/explosion/explosion", ".png");
        assert_eq!(
            paths,
            vec![
                "/explosion/explosion0000.png",
                "/explosion/explosion0001.png",
                "/explosion/explosion0002.png",
            ]
        );
    }

    #[test]
    fn numbered_paths_respect_first_index() {
        let paths = numbered_frame_paths(41, 2, 5, "frame-", ".jpg");
        assert_eq!(paths, vec!["frame-00041.jpg", "frame-00042.jpg"]);
    }
}
