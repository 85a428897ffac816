//! World layout: a 3x3 biome grid with dividing walls, the jungle lake and
//! volcano lava pools

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::consts::{LAVA_POOL_COUNT, WALL_THICKNESS};
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    Rocky,
    Frostlands,
    Swamp,
    Forest,
    Plains,
    Jungle,
    Volcano,
    Desert,
    Badlands,
}

/// Scattered-resource weights for a biome
#[derive(Debug, Clone, Copy)]
pub struct BiomeDensity {
    pub tree: f32,
    pub rock: f32,
    pub cactus: f32,
    pub spawn_multiplier: f32,
}

impl Biome {
    pub fn density(self) -> BiomeDensity {
        let (tree, rock, cactus, spawn_multiplier) = match self {
            Biome::Plains => (0.04, 0.02, 0.0, 1.5),
            Biome::Forest => (0.5, 0.0, 0.0, 3.0),
            Biome::Jungle => (0.2, 0.01, 0.0, 3.0),
            Biome::Frostlands => (0.15, 0.04, 0.0, 2.5),
            Biome::Desert => (0.0, 0.25, 0.2, 2.5),
            Biome::Rocky => (0.0, 0.8, 0.0, 4.0),
            // Swamp and volcano grow no trees
            Biome::Swamp => (0.0, 0.01, 0.0, 3.0),
            Biome::Volcano => (0.0, 0.5, 0.0, 4.0),
            Biome::Badlands => (0.0, 0.1, 0.05, 3.5),
        };
        BiomeDensity {
            tree,
            rock,
            cactus,
            spawn_multiplier,
        }
    }
}

/// Wall rectangle plus unlock tier
#[derive(Debug, Clone, Copy)]
pub struct WallSpec {
    pub rect: Rect,
    pub tier: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldLayout {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
    /// Left edge of the right column (swamp, jungle, badlands)
    pub third_x: f32,
    pub third_y: f32,
    pub lake: Rect,
    pub lava_pools: Vec<Rect>,
}

impl WorldLayout {
    pub fn new(tuning: &Tuning, rng: &mut impl Rng) -> Self {
        let width = tuning.world_width;
        let height = tuning.world_height;
        let third_x = width / 3.0;
        let third_y = height / 3.0;

        let jungle_x = width - third_x;
        let band_h = height - 2.0 * third_y;
        let lake = Rect::new(
            jungle_x + third_x * 0.15,
            third_y + band_h * 0.2,
            third_x * 0.7,
            band_h * 0.6,
        );

        let volcano_y = height - third_y;
        let lava_pools = (0..LAVA_POOL_COUNT)
            .map(|_| {
                let w = third_x * 0.1 + rng.random::<f32>() * third_x * 0.2;
                let h = third_y * 0.1 + rng.random::<f32>() * third_y * 0.2;
                Rect::new(
                    rng.random::<f32>() * (third_x - w),
                    volcano_y + rng.random::<f32>() * (third_y - h),
                    w,
                    h,
                )
            })
            .collect();

        Self {
            width,
            height,
            padding: tuning.island_padding,
            third_x,
            third_y,
            lake,
            lava_pools,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    fn forest_x_end(&self) -> f32 {
        self.third_x
    }

    fn jungle_x_start(&self) -> f32 {
        self.width - self.third_x
    }

    fn frost_y_end(&self) -> f32 {
        self.third_y
    }

    fn desert_y_start(&self) -> f32 {
        self.height - self.third_y
    }

    pub fn biome_at(&self, p: Vec2) -> Biome {
        let left = p.x < self.forest_x_end();
        let right = p.x > self.jungle_x_start();
        let top = p.y < self.frost_y_end();
        let bottom = p.y > self.desert_y_start();
        match (left, right, top, bottom) {
            (true, _, true, _) => Biome::Rocky,
            (_, true, true, _) => Biome::Swamp,
            (true, _, _, true) => Biome::Volcano,
            (_, true, _, true) => Biome::Badlands,
            (_, _, true, _) => Biome::Frostlands,
            (_, _, _, true) => Biome::Desert,
            (true, _, _, _) => Biome::Forest,
            (_, true, _, _) => Biome::Jungle,
            _ => Biome::Plains,
        }
    }

    /// Bounds of a biome cell
    pub fn biome_rect(&self, biome: Biome) -> Rect {
        let xs = [0.0, self.forest_x_end(), self.jungle_x_start(), self.width];
        let ys = [0.0, self.frost_y_end(), self.desert_y_start(), self.height];
        let (col, row) = match biome {
            Biome::Rocky => (0, 0),
            Biome::Frostlands => (1, 0),
            Biome::Swamp => (2, 0),
            Biome::Forest => (0, 1),
            Biome::Plains => (1, 1),
            Biome::Jungle => (2, 1),
            Biome::Volcano => (0, 2),
            Biome::Desert => (1, 2),
            Biome::Badlands => (2, 2),
        };
        Rect::from_corners(
            Vec2::new(xs[col], ys[row]),
            Vec2::new(xs[col + 1], ys[row + 1]),
        )
    }

    /// Lake, lava or the island's padded border
    pub fn is_hazard(&self, p: Vec2) -> bool {
        let half_pad = self.padding / 2.0;
        self.lake.contains(p)
            || self.lava_pools.iter().any(|pool| pool.contains(p))
            || p.x < half_pad
            || p.x > self.width - half_pad
            || p.y < half_pad
            || p.y > self.height - half_pad
    }

    /// Biome-dividing walls with their unlock tiers
    pub fn wall_specs(&self) -> Vec<WallSpec> {
        let t = WALL_THICKNESS;
        let half = t / 2.0;
        let fx = self.forest_x_end();
        let jx = self.jungle_x_start();
        let fy = self.frost_y_end();
        let dy = self.desert_y_start();
        let (w, h) = (self.width, self.height);
        let spec = |x, y, width, height, tier| WallSpec {
            rect: Rect::new(x, y, width, height),
            tier,
        };
        vec![
            // Plains sides
            spec(fx - half, fy, t, dy - fy, 1),
            spec(jx - half, fy, t, dy - fy, 1),
            // Frostlands sides
            spec(fx - half, 0.0, t, fy, 2),
            spec(jx - half, 0.0, t, fy, 2),
            // Desert sides
            spec(fx - half, dy, t, h - dy, 3),
            spec(jx - half, dy, t, h - dy, 3),
            // Horizontal dividers
            spec(fx, fy - half, jx - fx, t, 4),
            spec(fx, dy - half, jx - fx, t, 4),
            spec(0.0, fy - half, fx, t, 4),
            spec(jx, fy - half, w - jx, t, 4),
            spec(0.0, dy - half, fx, t, 4),
            spec(jx, dy - half, w - jx, t, 4),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn layout() -> WorldLayout {
        WorldLayout::new(&Tuning::default(), &mut Pcg32::seed_from_u64(1))
    }

    #[test]
    fn test_biome_grid() {
        let world = layout();
        assert_eq!(world.biome_at(world.center()), Biome::Plains);
        assert_eq!(world.biome_at(Vec2::new(10.0, 10.0)), Biome::Rocky);
        assert_eq!(world.biome_at(Vec2::new(19_990.0, 14_990.0)), Biome::Badlands);
        assert_eq!(world.biome_at(Vec2::new(10.0, 7500.0)), Biome::Forest);
        assert_eq!(world.biome_at(Vec2::new(10_000.0, 10.0)), Biome::Frostlands);
    }

    #[test]
    fn test_lake_inside_jungle() {
        let world = layout();
        assert_eq!(world.biome_at(world.lake.center()), Biome::Jungle);
        assert!(world.is_hazard(world.lake.center()));
    }

    #[test]
    fn test_lava_in_volcano() {
        let world = layout();
        assert_eq!(world.lava_pools.len(), LAVA_POOL_COUNT);
        for pool in &world.lava_pools {
            assert_eq!(world.biome_at(pool.center()), Biome::Volcano);
        }
    }

    #[test]
    fn test_plains_walled_by_tier_one() {
        let world = layout();
        let plains = world.biome_rect(Biome::Plains);
        let tier_one: Vec<_> = world.wall_specs().into_iter().filter(|w| w.tier == 1).collect();
        assert_eq!(tier_one.len(), 2);
        for wall in tier_one {
            assert!((wall.rect.center().y - plains.center().y).abs() < 1.0);
        }
    }
}
