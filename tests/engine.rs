mod tests {
    use myrtio_stage_lights::{
        Engine, EngineConfig, EngineIntent, Flag, Instant, IntentChannel, PixelRange,
        SegmentChange, SegmentConfig, SegmentId, Stage, StoragePhase, Trigger,
        color::{BLACK, RED, WHITE},
    };

    type DemoEngine<'a> = Engine<'a, 160, 8>;

    fn demo(channel: &IntentChannel<8>) -> DemoEngine<'_> {
        Engine::new(channel.receiver(), &EngineConfig::hydrogen_demo()).unwrap()
    }

    /// Render every 10ms from `*t` up to and including `until`
    fn advance(engine: &mut DemoEngine<'_>, t: &mut u64, until: u64) {
        while *t <= until {
            engine.render(Instant::from_millis(*t));
            *t += 10;
        }
    }

    fn storage_phase(engine: &DemoEngine<'_>) -> Option<StoragePhase> {
        engine.controller().storage().map(|s| s.phase())
    }

    fn all_black(engine: &DemoEngine<'_>) -> bool {
        engine.pixels().iter().all(|p| *p == BLACK)
    }

    #[test]
    fn test_chain_runs_from_wind_to_street_light() {
        let channel = IntentChannel::<8>::new();
        let mut engine = demo(&channel);
        let mut t = 0;
        channel.sender().post(EngineIntent::StartCycle).unwrap();

        advance(&mut engine, &mut t, 1100);
        assert!(engine.flags().get(Flag::Wind));
        assert!(!engine.flags().get(Flag::ElectricityProduction));
        advance(&mut engine, &mut t, 1300);
        assert!(engine.flags().get(Flag::ElectricityProduction));
        assert_eq!(engine.pixels()[140], RED);
        assert_eq!(engine.pixels()[141], RED);

        advance(&mut engine, &mut t, 2400);
        assert!(!engine.flags().get(Flag::Electrolyser));
        advance(&mut engine, &mut t, 2600);
        assert!(engine.flags().get(Flag::Electrolyser));

        // Hydrogen production waits two seconds behind the electrolyser
        advance(&mut engine, &mut t, 4400);
        assert!(!engine.flags().get(Flag::HydrogenProduction));
        advance(&mut engine, &mut t, 4600);
        assert!(engine.flags().get(Flag::HydrogenProduction));
        assert!(engine.flags().get(Flag::HydrogenTransport));

        advance(&mut engine, &mut t, 7400);
        assert!(engine.flags().get(Flag::HydrogenStorage));
        assert!(!engine.flags().get(Flag::StorageFull));
        advance(&mut engine, &mut t, 7600);
        assert!(engine.flags().get(Flag::StorageFull));
        assert_eq!(storage_phase(&engine), Some(StoragePhase::Hold));

        advance(&mut engine, &mut t, 12400);
        assert_eq!(storage_phase(&engine), Some(StoragePhase::Hold));
        advance(&mut engine, &mut t, 12600);
        assert_eq!(storage_phase(&engine), Some(StoragePhase::Drain));

        advance(&mut engine, &mut t, 13600);
        assert!(!engine.flags().get(Flag::StorageTransport));
        advance(&mut engine, &mut t, 13800);
        assert!(engine.flags().get(Flag::StorageTransport));

        advance(&mut engine, &mut t, 16800);
        assert!(engine.flags().get(Flag::StoragePowerstation));
        assert!(engine.flags().get(Flag::ElectricityTransport));
        assert!(engine.flags().get(Flag::StreetLight));
    }

    #[test]
    fn test_cycle_expires_and_resets() {
        let channel = IntentChannel::<8>::new();
        let mut engine = demo(&channel);
        let mut t = 0;
        channel.sender().post(EngineIntent::StartCycle).unwrap();
        advance(&mut engine, &mut t, 10);
        assert!(!engine.is_ready());

        advance(&mut engine, &mut t, 60200);
        for flag in [
            Flag::Wind,
            Flag::ElectricityProduction,
            Flag::Electrolyser,
            Flag::HydrogenProduction,
        ] {
            assert!(!engine.flags().get(flag), "{} still set", flag.as_str());
        }
        assert!(engine.flags().get(Flag::StorageFull));

        advance(&mut engine, &mut t, 120_000);
        assert!(engine.flags().is_empty());
        assert!(engine.is_ready());
        assert!(all_black(&engine));

        channel.sender().post(EngineIntent::StartCycle).unwrap();
        advance(&mut engine, &mut t, 120_010);
        assert!(engine.flags().get(Flag::Wind));
    }

    #[test]
    fn test_start_ignored_while_running() {
        let channel = IntentChannel::<8>::new();
        let mut engine = demo(&channel);
        assert!(engine.is_ready());
        assert!(engine.start_cycle(Instant::from_millis(0)));
        assert!(!engine.start_cycle(Instant::from_millis(10)));
    }

    #[test]
    fn test_auto_start() {
        let channel = IntentChannel::<8>::new();
        let mut config = EngineConfig::hydrogen_demo();
        config.cycle.auto_start = true;
        let mut engine = DemoEngine::new(channel.receiver(), &config).unwrap();

        engine.render(Instant::from_millis(0));
        assert!(engine.flags().get(Flag::Wind));
    }

    #[test]
    fn test_reset_intent_clears_chain() {
        let channel = IntentChannel::<8>::new();
        let mut engine = demo(&channel);
        let mut t = 0;
        channel.sender().post(EngineIntent::StartCycle).unwrap();
        advance(&mut engine, &mut t, 3000);
        assert!(!all_black(&engine));

        channel.sender().post(EngineIntent::Reset).unwrap();
        advance(&mut engine, &mut t, 3010);
        assert!(engine.flags().is_empty());
        assert!(engine.is_ready());
        assert!(all_black(&engine));
        for segment in engine.controller().segments() {
            let config = segment.config();
            assert_eq!(segment.cursor(), config.range.initial(config.direction));
        }
    }

    #[test]
    fn test_disabled_wind_keeps_solar_feeding() {
        let channel = IntentChannel::<8>::new();
        let mut engine = demo(&channel);
        let mut t = 0;
        let sender = channel.sender();
        sender
            .post(EngineIntent::Segment(Stage::Wind.id(), SegmentChange::Enabled(false)))
            .unwrap();
        sender.post(EngineIntent::StartCycle).unwrap();

        advance(&mut engine, &mut t, 1300);
        assert!(engine.pixels()[0..=9].iter().all(|p| *p == BLACK));
        assert!(engine.flags().get(Flag::ElectricityProduction));
    }

    #[test]
    fn test_rejected_intent_is_dropped() {
        let channel = IntentChannel::<8>::new();
        let mut engine = demo(&channel);
        let mut t = 0;
        let sender = channel.sender();
        sender
            .post(EngineIntent::Segment(SegmentId(40), SegmentChange::Enabled(false)))
            .unwrap();
        sender
            .post(EngineIntent::Segment(
                Stage::Wind.id(),
                SegmentChange::Range { start: 400, end: 410 },
            ))
            .unwrap();
        sender.post(EngineIntent::StartCycle).unwrap();

        advance(&mut engine, &mut t, 0);
        assert!(engine.flags().get(Flag::Wind));
        let wind = engine.controller().segment(Stage::Wind.id()).map(|s| s.config().range);
        assert_eq!(wind, Some(PixelRange::new(0, 9)));
    }

    #[test]
    fn test_custom_segment_intents() {
        let channel = IntentChannel::<8>::new();
        let mut engine = demo(&channel);
        let mut t = 0;
        let custom = SegmentConfig::new("custom", PixelRange::new(147, 149), WHITE, Trigger::AlwaysOn);
        channel.sender().post(EngineIntent::AddCustom(custom)).unwrap();

        advance(&mut engine, &mut t, 0);
        assert_eq!(engine.controller().custom_count(), 1);
        assert_eq!(engine.pixels()[147], WHITE);

        channel.sender().post(EngineIntent::RemoveCustom(SegmentId(12))).unwrap();
        advance(&mut engine, &mut t, 10);
        assert_eq!(engine.controller().custom_count(), 0);
        assert_eq!(engine.pixels()[147], BLACK);
    }

    #[test]
    fn test_led_check_mode() {
        let channel = IntentChannel::<8>::new();
        let mut engine = demo(&channel);
        let sender = channel.sender();
        sender.post(EngineIntent::StartTest(PixelRange::new(0, 4))).unwrap();
        sender.post(EngineIntent::StartCycle).unwrap();

        engine.render(Instant::from_millis(0));
        assert!(engine.is_testing());
        assert!(!engine.is_ready());
        assert!(engine.flags().is_empty());
        assert_eq!(engine.pixels()[0], WHITE);
        assert_eq!(engine.pixels().iter().filter(|p| **p == WHITE).count(), 1);

        engine.render(Instant::from_millis(100));
        assert_eq!(engine.pixels()[0], BLACK);
        assert_eq!(engine.pixels()[1], WHITE);
        engine.render(Instant::from_millis(150));
        assert_eq!(engine.pixels()[1], WHITE);

        sender.post(EngineIntent::StopTest).unwrap();
        engine.render(Instant::from_millis(200));
        assert!(!engine.is_testing());
        assert!(engine.is_ready());
        assert!(all_black(&engine));
    }
}
