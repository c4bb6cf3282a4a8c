use std::collections::HashMap;

use abyss_core::{ChunkCoord, Surface};
use macroquad::texture::{FilterMode, Texture2D};

/// GPU copies of terrain chunks, dropped wholesale when the terrain changes.
#[derive(Debug)]
pub(crate) struct ChunkTextures {
    cache: GenerationCache<Texture2D>,
}

impl ChunkTextures {
    pub(crate) fn new() -> Self {
        Self {
            cache: GenerationCache::new(),
        }
    }

    /// Returns the texture for `coord`, uploading `surface` on first use.
    pub(crate) fn texture(
        &mut self,
        generation: u64,
        coord: ChunkCoord,
        surface: &Surface,
    ) -> Option<Texture2D> {
        for stale in self.cache.sync(generation) {
            stale.delete();
        }
        let (Ok(width), Ok(height)) = (
            u16::try_from(surface.width()),
            u16::try_from(surface.height()),
        ) else {
            return None;
        };
        let texture = *self.cache.get_or_insert_with(coord, || {
            let texture = Texture2D::from_rgba8(width, height, &surface.to_rgba8());
            texture.set_filter(FilterMode::Nearest);
            texture
        });
        Some(texture)
    }
}

/// Map keyed by chunk that empties itself when the generation moves on.
#[derive(Debug)]
pub(crate) struct GenerationCache<T> {
    generation: Option<u64>,
    entries: HashMap<ChunkCoord, T>,
}

impl<T> GenerationCache<T> {
    pub(crate) fn new() -> Self {
        Self {
            generation: None,
            entries: HashMap::new(),
        }
    }

    /// Adopts `generation`, returning the entries it invalidated.
    pub(crate) fn sync(&mut self, generation: u64) -> Vec<T> {
        if self.generation == Some(generation) {
            return Vec::new();
        }
        self.generation = Some(generation);
        self.entries.drain().map(|(_, entry)| entry).collect()
    }

    pub(crate) fn get_or_insert_with<F>(&mut self, coord: ChunkCoord, create: F) -> &T
    where
        F: FnOnce() -> T,
    {
        self.entries.entry(coord).or_insert_with(create)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_survive_within_a_generation() {
        let mut cache = GenerationCache::new();
        assert!(cache.sync(1).is_empty());
        let mut uploads = 0;
        for _ in 0..3 {
            let _ = cache.get_or_insert_with(ChunkCoord::new(0, 0), || {
                uploads += 1;
                uploads
            });
        }

        assert_eq!(uploads, 1);
        assert!(cache.sync(1).is_empty());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn new_generation_evicts_everything() {
        let mut cache = GenerationCache::new();
        let _ = cache.sync(1);
        let _ = cache.get_or_insert_with(ChunkCoord::new(0, 0), || 'a');
        let _ = cache.get_or_insert_with(ChunkCoord::new(1, 0), || 'b');

        let mut evicted = cache.sync(2);
        evicted.sort_unstable();

        assert_eq!(evicted, vec!['a', 'b']);
        assert_eq!(cache.len(), 0);
        assert_eq!(*cache.get_or_insert_with(ChunkCoord::new(0, 0), || 'c'), 'c');
    }
}
