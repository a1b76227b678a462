use std::collections::HashSet;

use kmeans_colors::get_kmeans;
use palette::Srgb;

use crate::color::Color;
use crate::config::RemapOptions;

/// Parameters for a k-means run over RGB colors.
#[derive(Debug, Clone, Copy)]
pub struct KmeansParams {
    pub runs: u64,
    pub max_iter: usize,
    pub converge: f32,
    pub seed: u64,
}

impl Default for KmeansParams {
    fn default() -> Self {
        Self {
            runs: 1,
            max_iter: 20,
            converge: 1e-4,
            seed: 0,
        }
    }
}

impl From<&RemapOptions> for KmeansParams {
    fn from(options: &RemapOptions) -> Self {
        Self {
            runs: options.n_init,
            max_iter: options.max_iter,
            converge: options.converge,
            seed: options.seed,
        }
    }
}

/// Cluster centers with the number of input colors assigned to each.
#[derive(Debug, Clone, PartialEq)]
pub struct Clusters {
    pub centroids: Vec<Color>,
    pub sizes: Vec<usize>,
}

/// Cluster `colors` into at most `k` groups.
///
/// `k` is capped at the number of distinct input colors so that seeding never
/// runs out of candidates. Returns `None` for empty input. With several runs,
/// each run is seeded with `seed + run` and the lowest score wins.
pub fn kmeans(colors: &[Color], k: usize, params: &KmeansParams) -> Option<Clusters> {
    let distinct = colors.iter().collect::<HashSet<_>>().len();
    let k = k.min(distinct).min(u8::MAX as usize);
    if k == 0 {
        return None;
    }

    let buf: Vec<Srgb<f32>> = colors
        .iter()
        .map(|c| Srgb::new(c.r, c.g, c.b).into_format::<f32>())
        .collect();

    let best = (0..params.runs.max(1))
        .map(|run| {
            get_kmeans(
                k,
                params.max_iter,
                params.converge,
                false,
                &buf,
                params.seed.wrapping_add(run),
            )
        })
        .min_by(|a, b| a.score.total_cmp(&b.score))?;

    let centroids: Vec<Color> = best
        .centroids
        .iter()
        .map(|&centroid| {
            Color::new(
                truncate_channel(centroid.red),
                truncate_channel(centroid.green),
                truncate_channel(centroid.blue),
            )
        })
        .collect();

    let mut sizes = vec![0usize; centroids.len()];
    for &index in &best.indices {
        if let Some(size) = sizes.get_mut(index as usize) {
            *size += 1;
        }
    }

    Some(Clusters { centroids, sizes })
}

/// Scale a `[0, 1]` channel to `u8`, dropping the fraction. The small bias
/// keeps exact integers that `f32` stores just below their value.
fn truncate_channel(value: f32) -> u8 {
    (value * 255.0 + 1e-3).clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::new(255, 0, 0);
    const BLUE: Color = Color::new(0, 0, 255);

    #[test]
    fn empty_input_has_no_clusters() {
        assert!(kmeans(&[], 3, &KmeansParams::default()).is_none());
    }

    #[test]
    fn k_capped_by_distinct_colors() {
        let colors = vec![RED; 10];
        let clusters = kmeans(&colors, 5, &KmeansParams::default()).unwrap();
        assert_eq!(clusters.centroids, vec![RED]);
        assert_eq!(clusters.sizes, vec![10]);
    }

    #[test]
    fn separates_exact_colors() {
        let mut colors = vec![RED; 30];
        colors.extend(vec![BLUE; 10]);
        let clusters = kmeans(&colors, 2, &KmeansParams::default()).unwrap();

        assert_eq!(clusters.centroids.len(), 2);
        assert!(clusters.centroids.contains(&RED));
        assert!(clusters.centroids.contains(&BLUE));
        let red_index = clusters.centroids.iter().position(|c| *c == RED).unwrap();
        assert_eq!(clusters.sizes[red_index], 30);
        assert_eq!(clusters.sizes.iter().sum::<usize>(), 40);
    }

    #[test]
    fn centroids_truncate() {
        let colors = vec![Color::new(10, 10, 10), Color::new(11, 11, 11)];
        let clusters = kmeans(&colors, 1, &KmeansParams::default()).unwrap();
        assert_eq!(clusters.centroids, vec![Color::new(10, 10, 10)]);
    }

    #[test]
    fn exact_channels_survive_conversion() {
        let color = Color::new(200, 101, 3);
        let clusters = kmeans(&[color; 4], 1, &KmeansParams::default()).unwrap();
        assert_eq!(clusters.centroids, vec![color]);
    }

    #[test]
    fn deterministic_for_fixed_seed() {
        let colors: Vec<Color> = (0..200u32)
            .map(|i| Color::new((i * 7 % 256) as u8, (i * 13 % 256) as u8, (i * 29 % 256) as u8))
            .collect();
        let params = KmeansParams {
            runs: 3,
            seed: 42,
            ..Default::default()
        };
        assert_eq!(kmeans(&colors, 4, &params), kmeans(&colors, 4, &params));
    }
}
