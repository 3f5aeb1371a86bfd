use photobooth_capture_engine::{CaptureSession, SyntheticCamera};
use photobooth_frame_model::{FrameType, PhotoConfig};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Action {
    SetTarget(usize),
    Start,
    End,
    Capture,
    Save,
    Retake,
    Delete(usize),
    Reset,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0usize..9).prop_map(Action::SetTarget),
        Just(Action::Start),
        Just(Action::End),
        Just(Action::Capture),
        Just(Action::Save),
        Just(Action::Retake),
        (0usize..8).prop_map(Action::Delete),
        Just(Action::Reset),
    ]
}

fn frame_type() -> impl Strategy<Value = FrameType> {
    prop_oneof![Just(FrameType::Landscape), Just(FrameType::Portrait)]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime should build")
}

fn check_invariants(session: &CaptureSession) {
    let config = session.photo_config();
    assert!(session.photos().len() <= session.target_count());
    if config.pairing {
        assert_eq!(session.target_count() % 2, 0);
        assert!(session.target_count() >= 2);
    } else {
        assert!(session.target_count() >= 1);
    }
    if session.pending().is_some() {
        assert!(session.is_active());
    }
    assert_eq!(
        session.remaining(),
        session.target_count() - session.photos().len()
    );
}

proptest! {
    #[test]
    fn session_invariants_hold_for_any_action_sequence(
        frame_type in frame_type(),
        actions in prop::collection::vec(action(), 0..40),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let camera = SyntheticCamera::with_size(4, 3);
            let stats = camera.stats();
            let mut session =
                CaptureSession::new(PhotoConfig::for_frame_type(frame_type), Box::new(camera));

            for action in actions {
                let before = session.photos().len();
                let had_pending = session.pending().is_some();
                match action {
                    Action::SetTarget(n) => {
                        let _ = session.set_target_count(n);
                    }
                    Action::Start => {
                        let _ = session.start().await;
                    }
                    Action::End => session.end(),
                    Action::Capture => {
                        let _ = session.capture().await;
                    }
                    Action::Save => {
                        let saved = session.save();
                        if had_pending {
                            assert_eq!(saved.ok(), Some(before));
                            assert_eq!(session.photos().len(), before + 1);
                        } else {
                            assert!(saved.is_err());
                            assert_eq!(session.photos().len(), before);
                        }
                    }
                    Action::Retake => {
                        let _ = session.retake();
                        assert_eq!(session.photos().len(), before);
                    }
                    Action::Delete(i) => {
                        let deleted = session.delete_photo(i);
                        assert_eq!(deleted.is_ok(), i < before);
                    }
                    Action::Reset => session.reset(),
                }
                check_invariants(&session);
                assert_eq!(stats.open_streams(), usize::from(session.is_active()));
            }

            drop(session);
            assert_eq!(stats.open_streams(), 0);
        });
    }

    #[test]
    fn pairing_targets_round_up_to_even(requested in 2usize..64) {
        let session = &mut CaptureSession::new(
            PhotoConfig::for_frame_type(FrameType::Landscape),
            Box::new(SyntheticCamera::with_size(2, 2)),
        );
        let stored = session.set_target_count(requested).unwrap();
        prop_assert_eq!(stored % 2, 0);
        prop_assert!(stored >= requested);
        prop_assert!(stored - requested <= 1);
    }
}
