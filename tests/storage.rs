mod tests {
    use embassy_time::{Duration, Instant};
    use heapless::Vec;
    use myrtio_stage_lights::{
        CycleConfig, EngineConfig, Flag, PixelBuffer, PixelRange, Propagation, Rgb, SegmentConfig,
        SegmentId, StageController, StorageConfig, StoragePhase, Trigger, Waypoint,
        color::{BLACK, dim},
        storage::PipePhase,
    };

    const STORAGE: Rgb = Rgb::new(0, 250, 180);
    const PIPE: Rgb = Rgb::new(0, 250, 60);
    const SENTINEL: Rgb = Rgb::new(7, 7, 7);

    fn segment(name: &str, range: PixelRange, color: Rgb, trigger: Trigger) -> SegmentConfig {
        SegmentConfig::new(name, range, color, trigger).with_delay(Duration::from_millis(10))
    }

    /// Two five-pixel tanks at 0..=9, optional ten-pixel pipe at 10..=19
    fn config(with_pipe: bool) -> EngineConfig {
        let mut segments = Vec::new();
        let _ = segments.push(segment("tank_1", PixelRange::new(0, 4), STORAGE, Trigger::HydrogenStorage));
        let _ = segments.push(segment("tank_2", PixelRange::new(5, 9), STORAGE, Trigger::HydrogenStorage));
        if with_pipe {
            let _ = segments.push(
                segment("pipe", PixelRange::new(10, 19), PIPE, Trigger::HydrogenTransport)
                    .propagate(Propagation::follow(Waypoint::Terminal, Flag::HydrogenStorage)),
            );
        }

        let mut members = Vec::new();
        let _ = members.push(SegmentId(0));
        let _ = members.push(SegmentId(1));

        EngineConfig {
            led_count: 20,
            segments,
            delayed: Vec::new(),
            storage: Some(StorageConfig {
                members,
                pipe: with_pipe.then_some(SegmentId(2)),
                full: Flag::StorageFull,
                drained: Flag::StorageTransport,
                clear_on_hold: Some(Flag::H2Consumption),
                hold: Duration::from_millis(1000),
            }),
            indicators: Vec::new(),
            cycle: CycleConfig {
                source: Flag::Wind,
                source_duration: Duration::from_secs(60),
                run_duration: Duration::from_secs(120),
                auto_start: false,
            },
            fade_duration: Duration::from_millis(1000),
            fire_seed: 1,
        }
    }

    fn phase(controller: &StageController<20>) -> StoragePhase {
        controller.storage().map(|s| s.phase()).unwrap()
    }

    fn tick(controller: &mut StageController<20>, pixels: &mut PixelBuffer<20>, t: u64) {
        controller.tick(pixels, Instant::from_millis(t));
    }

    /// Fill both tanks; full is reached on the tick at 30ms
    fn fill(controller: &mut StageController<20>, pixels: &mut PixelBuffer<20>) {
        controller.set_flag(Flag::HydrogenStorage, true);
        for t in [0, 10, 20] {
            tick(controller, pixels, t);
            assert_eq!(phase(controller), StoragePhase::Fill);
            assert!(!controller.flags().get(Flag::StorageFull));
        }
        tick(controller, pixels, 30);
        assert!(controller.flags().get(Flag::StorageFull));
        assert_eq!(phase(controller), StoragePhase::Hold);
    }

    #[test]
    fn test_hold_paints_dim_once() {
        let mut controller = StageController::<20>::new(&config(false));
        let mut pixels = PixelBuffer::<20>::new(20);
        controller.set_flag(Flag::H2Consumption, true);
        fill(&mut controller, &mut pixels);

        tick(&mut controller, &mut pixels, 40);
        for i in 0..=9 {
            assert_eq!(pixels.get(i), Some(dim(STORAGE, 10)));
        }
        assert!(!controller.flags().get(Flag::H2Consumption));

        pixels.set(2, SENTINEL);
        for t in [50, 60, 70] {
            tick(&mut controller, &mut pixels, t);
            assert_eq!(phase(&controller), StoragePhase::Hold);
        }
        assert_eq!(pixels.get(2), Some(SENTINEL));
    }

    #[test]
    fn test_no_drain_before_hold_elapses() {
        let mut controller = StageController::<20>::new(&config(false));
        let mut pixels = PixelBuffer::<20>::new(20);
        fill(&mut controller, &mut pixels);

        // Hold starts at 40ms and lasts one second
        for t in (40..1040).step_by(10) {
            tick(&mut controller, &mut pixels, t);
            assert_eq!(phase(&controller), StoragePhase::Hold, "drained early at {t}ms");
        }
        tick(&mut controller, &mut pixels, 1040);
        assert_eq!(phase(&controller), StoragePhase::Drain);
        assert!(!controller.flags().get(Flag::StorageTransport));
    }

    #[test]
    fn test_drain_runs_backward_and_raises_transport() {
        let mut controller = StageController::<20>::new(&config(false));
        let mut pixels = PixelBuffer::<20>::new(20);
        fill(&mut controller, &mut pixels);
        for t in (40..1040).step_by(10) {
            tick(&mut controller, &mut pixels, t);
        }

        let mut cursors = std::vec::Vec::new();
        for t in [1040, 1050, 1060] {
            tick(&mut controller, &mut pixels, t);
            cursors.push(controller.segments()[0].cursor());
            assert!(!controller.flags().get(Flag::StorageTransport));
        }
        assert_eq!(cursors, [3, 2, 1]);

        tick(&mut controller, &mut pixels, 1070);
        assert!(controller.flags().get(Flag::StorageTransport));
        assert_eq!(phase(&controller), StoragePhase::Idle);
        assert!((0..=9).all(|i| pixels.get(i) == Some(BLACK)));

        // Drained tanks stay dark until the chain resets
        for t in (1080..=2000).step_by(10) {
            tick(&mut controller, &mut pixels, t);
        }
        assert_eq!(phase(&controller), StoragePhase::Idle);
        assert!(controller.flags().get(Flag::StorageTransport));
        assert!((0..=9).all(|i| pixels.get(i) == Some(BLACK)));
    }

    #[test]
    fn test_interrupted_fill_clears_tanks() {
        let mut controller = StageController::<20>::new(&config(false));
        let mut pixels = PixelBuffer::<20>::new(20);
        controller.set_flag(Flag::HydrogenStorage, true);
        tick(&mut controller, &mut pixels, 0);
        tick(&mut controller, &mut pixels, 10);
        assert_ne!(pixels.get(0), Some(BLACK));

        controller.set_flag(Flag::HydrogenStorage, false);
        tick(&mut controller, &mut pixels, 20);
        assert_eq!(phase(&controller), StoragePhase::Idle);
        assert!((0..=9).all(|i| pixels.get(i) == Some(BLACK)));
        assert_eq!(controller.segments()[0].cursor(), 0);
        assert!(controller.segments()[0].runtime().is_first_run());
    }

    #[test]
    fn test_pipe_drains_after_release() {
        let mut controller = StageController::<20>::new(&config(true));
        let mut pixels = PixelBuffer::<20>::new(20);
        controller.set_flag(Flag::HydrogenTransport, true);

        let mut t = 0;
        while !controller.flags().get(Flag::StorageFull) {
            tick(&mut controller, &mut pixels, t);
            t += 10;
            assert!(t < 1000, "tanks never filled");
        }
        assert_eq!(controller.storage().map(|s| s.pipe_phase()), Some(PipePhase::Primed));

        controller.set_flag(Flag::HydrogenTransport, false);
        tick(&mut controller, &mut pixels, t);
        assert_eq!(controller.storage().map(|s| s.pipe_phase()), Some(PipePhase::Draining));
        for i in 10..=19 {
            assert_eq!(pixels.get(i), Some(dim(STORAGE, 20)));
        }
        // The pipe no longer feeds the tanks
        assert!(!controller.flags().get(Flag::HydrogenStorage));

        for step in 1..=10 {
            tick(&mut controller, &mut pixels, t + step * 10);
        }
        assert_eq!(controller.storage().map(|s| s.pipe_phase()), Some(PipePhase::Empty));
        assert!((10..=19).all(|i| pixels.get(i) == Some(BLACK)));
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut controller = StageController::<20>::new(&config(false));
        let mut pixels = PixelBuffer::<20>::new(20);
        fill(&mut controller, &mut pixels);
        tick(&mut controller, &mut pixels, 40);

        controller.reset(&mut pixels, Instant::from_millis(50));
        assert!(controller.flags().is_empty());
        assert_eq!(phase(&controller), StoragePhase::Idle);
        assert!(pixels.as_slice().iter().all(|p| *p == BLACK));

        controller.set_flag(Flag::HydrogenStorage, true);
        tick(&mut controller, &mut pixels, 60);
        assert_eq!(phase(&controller), StoragePhase::Fill);
        assert_eq!(pixels.get(0), Some(STORAGE));
    }
}
