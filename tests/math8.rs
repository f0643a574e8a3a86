mod tests {
    use embassy_time::{Duration, Instant};
    use myrtio_stage_lights::clock::{elapsed_ms, has_elapsed};
    use myrtio_stage_lights::math8::{progress8, qadd8, qsub8, scale8, scale8_video};

    #[test]
    fn test_scale8() {
        assert_eq!(scale8(255, 128), 128);
        assert_eq!(scale8(0, 128), 0);
        assert_eq!(scale8(128, 128), 64);
        assert_eq!(scale8(128, 255), 128);
        assert_eq!(scale8(128, 0), 0);
    }

    #[test]
    fn test_scale8_video_keeps_non_zero() {
        assert_eq!(scale8_video(0, 200), 0);
        assert_eq!(scale8_video(200, 0), 0);
        assert_eq!(scale8_video(1, 1), 1);
        assert_eq!(scale8_video(255, 191), 191);
    }

    #[test]
    fn test_saturating_math() {
        assert_eq!(qadd8(200, 100), 255);
        assert_eq!(qadd8(10, 20), 30);
        assert_eq!(qsub8(10, 20), 0);
        assert_eq!(qsub8(30, 20), 10);
    }

    #[test]
    fn test_progress8() {
        assert_eq!(
            progress8(Duration::from_millis(0), Duration::from_millis(100)),
            0
        );
        assert_eq!(
            progress8(Duration::from_millis(50), Duration::from_millis(100)),
            127
        );
        assert_eq!(
            progress8(Duration::from_millis(100), Duration::from_millis(100)),
            255
        );
        assert_eq!(
            progress8(Duration::from_millis(10), Duration::from_millis(0)),
            0
        );
    }

    #[test]
    fn test_elapsed_survives_wraparound() {
        let since = Instant::from_millis(u64::MAX - 5);
        let now = Instant::from_millis(4);
        assert_eq!(elapsed_ms(now, since), 10);
        assert!(has_elapsed(now, since, Duration::from_millis(10)));
        assert!(!has_elapsed(now, since, Duration::from_millis(11)));
    }
}
