//! Recolors fully transparent pixels with the average color of their already
//! colored neighbours, spreading outward one ring at a time from the visible
//! content. Alpha is never touched, so the image looks the same; only the
//! color hidden under transparency changes. Consumers that rescale an icon
//! with straight alpha then pick up the content color at its edges instead
//! of black.
//!
//! Adapted from Asphalt (https://github.com/jackTabsCode/asphalt).

use std::collections::VecDeque;

use bit_vec::BitVec;
use image::{Rgba, RgbaImage};

const NEIGHBOURS: [(i64, i64); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// One bit per pixel.
struct PixelMask {
    width: u32,
    bits: BitVec,
}

impl PixelMask {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            bits: BitVec::from_elem(width as usize * height as usize, false),
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn get(&self, x: u32, y: u32) -> bool {
        self.bits.get(self.index(x, y)).unwrap_or(false)
    }

    fn set(&mut self, x: u32, y: u32) {
        let i = self.index(x, y);
        self.bits.set(i, true);
    }
}

fn neighbours(img: &RgbaImage, x: u32, y: u32) -> impl Iterator<Item = (u32, u32)> {
    let (w, h) = (i64::from(img.width()), i64::from(img.height()));
    NEIGHBOURS.iter().filter_map(move |(dx, dy)| {
        let nx = i64::from(x) + dx;
        let ny = i64::from(y) + dy;
        if nx < 0 || ny < 0 || nx >= w || ny >= h {
            return None;
        }
        Some((nx as u32, ny as u32))
    })
}

pub fn alpha_bleed(img: &mut RgbaImage) {
    let (w, h) = img.dimensions();
    let mut colored = PixelMask::new(w, h);
    let mut queued = PixelMask::new(w, h);
    let mut frontier = VecDeque::new();

    for (x, y, pixel) in img.enumerate_pixels() {
        if pixel[3] != 0 {
            colored.set(x, y);
            queued.set(x, y);
        }
    }

    // Seed with the transparent ring directly around visible content.
    for y in 0..h {
        for x in 0..w {
            if queued.get(x, y) {
                continue;
            }
            if neighbours(img, x, y).any(|(nx, ny)| colored.get(nx, ny)) {
                queued.set(x, y);
                frontier.push_back((x, y));
            }
        }
    }

    while !frontier.is_empty() {
        let ring: Vec<(u32, u32)> = frontier.drain(..).collect();
        let mut painted = Vec::with_capacity(ring.len());

        for (x, y) in ring {
            let mut sum = [0u32; 3];
            let mut count = 0u32;

            for (nx, ny) in neighbours(img, x, y) {
                if colored.get(nx, ny) {
                    let source = img.get_pixel(nx, ny);
                    for (acc, channel) in sum.iter_mut().zip(source.0) {
                        *acc += u32::from(channel);
                    }
                    count += 1;
                } else if !queued.get(nx, ny) {
                    queued.set(nx, ny);
                    frontier.push_back((nx, ny));
                }
            }

            let count = count.max(1);
            let color = Rgba([
                (sum[0] / count) as u8,
                (sum[1] / count) as u8,
                (sum[2] / count) as u8,
                0,
            ]);
            painted.push((x, y, color));
        }

        // Commit the whole ring at once so pixels in the same ring don't
        // sample each other.
        for (x, y, color) in painted {
            img.put_pixel(x, y, color);
            colored.set(x, y);
        }
    }
}
