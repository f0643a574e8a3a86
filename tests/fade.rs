mod tests {
    use embassy_time::{Duration, Instant};
    use myrtio_stage_lights::{
        Direction, PixelBuffer, PixelRange,
        color::WHITE,
        effect::{FADE_FLOOR, FadeEffect},
        math8::scale8,
        segment::SegmentRuntime,
    };

    const RANGE: PixelRange = PixelRange::new(2, 6);

    fn render(
        fade: &mut FadeEffect,
        pixels: &mut PixelBuffer<8>,
        runtime: &mut SegmentRuntime,
        t: u64,
    ) -> u8 {
        fade.render(pixels, RANGE, WHITE, None, runtime, Instant::from_millis(t));
        let level = pixels.get(RANGE.start()).map_or(0, |p| p.r);
        for i in RANGE.indices() {
            assert_eq!(pixels.as_slice()[i].r, level);
        }
        level
    }

    #[test]
    fn test_first_run_paints_floor() {
        let mut fade = FadeEffect::new(Duration::from_millis(1000));
        let mut pixels = PixelBuffer::<8>::new(8);
        let mut runtime = SegmentRuntime::new(RANGE, Direction::Forward);

        let level = render(&mut fade, &mut pixels, &mut runtime, 0);
        assert_eq!(level, scale8(255, FADE_FLOOR));
        assert!(!runtime.is_first_run());
        assert_eq!(pixels.get(1).map(|p| p.r), Some(0));
        assert_eq!(pixels.get(7).map(|p| p.r), Some(0));
    }

    #[test]
    fn test_breathing_is_monotonic_within_half_cycles() {
        let mut fade = FadeEffect::new(Duration::from_millis(1000));
        let mut pixels = PixelBuffer::<8>::new(8);
        let mut runtime = SegmentRuntime::new(RANGE, Direction::Forward);
        let floor = scale8(255, FADE_FLOOR);

        render(&mut fade, &mut pixels, &mut runtime, 0);

        let mut last = 0;
        for t in (10..1000).step_by(10) {
            let level = render(&mut fade, &mut pixels, &mut runtime, t);
            assert!(level >= last, "fade-in dropped at {t}ms");
            assert!(level >= floor);
            last = level;
        }
        assert!(fade.is_fading_in());

        let level = render(&mut fade, &mut pixels, &mut runtime, 1000);
        assert!(!fade.is_fading_in());
        assert_eq!(level, 255);

        let mut last = 255;
        for t in (1010..2000).step_by(10) {
            let level = render(&mut fade, &mut pixels, &mut runtime, t);
            assert!(level <= last, "fade-out rose at {t}ms");
            assert!(level >= floor);
            last = level;
        }

        render(&mut fade, &mut pixels, &mut runtime, 2000);
        assert!(fade.is_fading_in());
    }

    #[test]
    fn test_duration_override_and_zero_duration() {
        let mut fade = FadeEffect::new(Duration::from_millis(1000));
        let mut pixels = PixelBuffer::<8>::new(8);
        let mut runtime = SegmentRuntime::new(RANGE, Direction::Forward);
        let now = |t| Instant::from_millis(t);

        fade.render(&mut pixels, RANGE, WHITE, Some(Duration::from_millis(100)), &mut runtime, now(0));
        fade.render(&mut pixels, RANGE, WHITE, Some(Duration::from_millis(100)), &mut runtime, now(100));
        assert!(!fade.is_fading_in());

        fade.render(&mut pixels, RANGE, WHITE, Some(Duration::from_millis(0)), &mut runtime, now(101));
        assert!(fade.is_fading_in());
    }
}
