use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use wavegrid_core::{
    generate_target_colors, hsl_to_hex, normalize_frequency, ColorMorphConfig, FeatureFrame,
    GridConfig, ReactiveGrid,
};

fn active_grid(decay: f32) -> ReactiveGrid {
    let mut grid = ReactiveGrid::new(GridConfig {
        beat_decay: decay,
        ..GridConfig::default()
    })
    .expect("valid grid config");
    grid.activate();
    grid
}

proptest! {
    #[test]
    fn beat_intensity_decays_geometrically(decay in 0.001f32..0.999, frames in 0usize..200) {
        let mut grid = active_grid(decay);
        grid.on_beat(&FeatureFrame::with_bass(0.5));

        let mut last = grid.state().beat_intensity;
        for _ in 0..frames {
            grid.on_frame(FeatureFrame::default());
            let current = grid.state().beat_intensity;
            prop_assert!(current <= last);
            prop_assert!(current >= 0.0);
            last = current;
        }

        let expected = (1.0f64 - decay as f64).powi(frames as i32);
        let actual = grid.state().beat_intensity as f64;
        prop_assert!((actual - expected).abs() <= 1e-4 + expected * 1e-3,
            "expected {} got {}", expected, actual);
    }

    #[test]
    fn beat_always_resets_to_one(decay in 0.0f32..0.999, frames in 0usize..50, bass in 0.0f32..1.0) {
        let mut grid = active_grid(decay);
        for _ in 0..frames {
            grid.on_beat(&FeatureFrame::with_bass(bass));
            grid.on_frame(FeatureFrame::default());
        }
        grid.on_beat(&FeatureFrame::with_bass(bass));
        prop_assert_eq!(grid.state().beat_intensity, 1.0);
    }

    #[test]
    fn generated_palettes_respect_ranges(
        hue_min in 0u16..360,
        hue_max in 0u16..360,
        sat in (0u8..=100, 0u8..=100),
        light in (0u8..=100, 0u8..=100),
        seed in any::<u64>(),
    ) {
        let config = ColorMorphConfig {
            hue_range: [hue_min, hue_max],
            saturation_range: [sat.0.min(sat.1), sat.0.max(sat.1)],
            lightness_range: [light.0.min(light.1), light.0.max(light.1)],
            ..ColorMorphConfig::default()
        };
        prop_assert!(config.validate().is_ok());

        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..100 {
            let set = generate_target_colors(&config, &mut rng).unwrap();
            let h = set.primary.h as u16;
            if hue_min <= hue_max {
                prop_assert!(h >= hue_min && h <= hue_max);
            } else {
                prop_assert!(h >= hue_min || h <= hue_max);
            }
            prop_assert_eq!(set.secondary.h, (set.primary.h + 180.0) % 360.0);
        }
    }
}

#[test]
fn ten_thousand_default_palettes() {
    let config = ColorMorphConfig::default();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..10_000 {
        let set = generate_target_colors(&config, &mut rng).unwrap();
        assert_eq!(set.secondary.h, (set.primary.h + 180.0) % 360.0);
        assert!(set.primary.h < 360.0);
        assert!(set.primary.h >= 345.0 || set.primary.h <= 15.0);
        assert!((75.0..=90.0).contains(&set.primary.s));
        assert!((45.0..=55.0).contains(&set.primary.l));
        assert!((75.0..=90.0).contains(&set.shadow.s));
    }
}

#[test]
fn hex_conversion_sanity() {
    assert_eq!(hsl_to_hex(0.0, 0.0, 0.0), "#000000");
    assert_eq!(hsl_to_hex(0.0, 0.0, 100.0), "#ffffff");
    assert_eq!(hsl_to_hex(120.0, 100.0, 50.0), "#00ff00");
}

#[test]
fn frequency_normalization_is_logarithmic() {
    assert_eq!(normalize_frequency(20.0), 0.0);
    assert_eq!(normalize_frequency(20_000.0), 1.0);
    // Each decade covers a third of the scale
    assert!((normalize_frequency(200.0) - 1.0 / 3.0).abs() < 0.01);
    assert!((normalize_frequency(2_000.0) - 2.0 / 3.0).abs() < 0.01);
}
