//! Property tests for the registry, driven with seeded random interleavings.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tessellate_lib::config::{Config, WindowRule};
use tessellate_lib::wm::backend::{NetState, RecordingBackend, WindowAttributes};
use tessellate_lib::wm::client::{Client, ClientId};
use tessellate_lib::wm::cycle::Direction;
use tessellate_lib::wm::events::{Command, ProtocolEvent};
use tessellate_lib::wm::geometry::{Rect, WindowId};
use tessellate_lib::wm::layout::LayoutMode;
use tessellate_lib::wm::ledger::RecordKind;
use tessellate_lib::wm::registry::{Registry, ToggleAction};
use tessellate_lib::wm::rules::ManageRule;
use tessellate_lib::wm::stack::Layer;
use tessellate_lib::wm::WindowManager;

const SCREEN: Rect = Rect::new(0, 0, 1280, 800);

fn config() -> Config {
    Config {
        contexts: 3,
        workspaces: 4,
        ..Config::default()
    }
}

/// Windows of class `pinned` are sent to workspace 3 by rule.
fn session_config() -> Config {
    Config {
        rules: vec![WindowRule {
            class: Some("^pinned$".to_string()),
            workspace: Some(3),
            ..WindowRule::default()
        }],
        ..config()
    }
}

fn registry() -> Registry { Registry::new(&config(), SCREEN).unwrap() }

fn add(registry: &mut Registry, window: WindowId) -> ClientId {
    let client = Client::new(window, window + 10_000, Rect::new(20, 20, 300, 200));
    registry.manage(client, &ManageRule::default()).unwrap()
}

fn random_command(rng: &mut StdRng) -> Command {
    let direction = if rng.random_bool(0.5) { Direction::Forward } else { Direction::Backward };
    match rng.random_range(0..25) {
        0 => Command::FocusNext,
        1 => Command::FocusPrev,
        2 => Command::SwapNext,
        3 => Command::Workspace { index: rng.random_range(1..=4) },
        4 => Command::Context { letter: ['a', 'b', 'c'][rng.random_range(0..3)] },
        5 => Command::ToggleWorkspace,
        6 => Command::ToggleContext,
        7 => Command::NextWorkspace,
        8 => Command::SendToWorkspace { index: rng.random_range(1..=4) },
        9 => Command::SendToContext { letter: ['a', 'b', 'c'][rng.random_range(0..3)] },
        10 => Command::SetLayout { mode: LayoutMode::ALL[rng.random_range(0..LayoutMode::ALL.len())] },
        11 => Command::RotateClients { direction },
        12 => Command::Zoom,
        13 => Command::Fullscreen,
        14 => Command::Above,
        15 => Command::Below,
        16 => Command::Sticky,
        17 => Command::Iconify,
        18 => Command::Disown,
        19 => Command::Deiconify,
        20 => Command::Mark,
        21 => Command::JumpMarked,
        22 => Command::JumpPane,
        23 => Command::PrevWorkspace,
        _ => Command::ToggleSidebar,
    }
}

// ============================================================================
// Registry consistency
// ============================================================================

#[test]
fn test_random_manage_unmanage_keeps_registry_consistent() {
    for seed in [1_u64, 7, 42, 1337] {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut registry = registry();
        let mut live: Vec<ClientId> = Vec::new();
        let mut gone: Vec<WindowId> = Vec::new();

        for step in 0..300_u32 {
            if live.is_empty() || rng.random_bool(0.6) {
                let window = step + 1;
                let mut client = Client::new(window, window + 10_000, Rect::new(0, 0, 100, 100));
                if !live.is_empty() && rng.random_bool(0.3) {
                    client.parent = Some(live[rng.random_range(0..live.len())]);
                }
                let rule = ManageRule {
                    workspace: rng.random_bool(0.3).then(|| rng.random_range(0..4)),
                    ..ManageRule::default()
                };
                live.push(registry.manage(client, &rule).unwrap());
            } else {
                let id = live.swap_remove(rng.random_range(0..live.len()));
                gone.push(registry.client(id).unwrap().window);
                assert!(registry.unmanage(id));
            }
            registry.flush_changes();
            if let Err(violation) = registry.check_consistency() {
                panic!("seed {seed}, step {step}: {violation}");
            }
        }

        for window in gone {
            assert!(registry.win_client(window).is_none());
            assert!(registry.win_client(window + 10_000).is_none());
        }
    }
}

#[test]
fn test_random_session_keeps_registry_consistent() {
    for seed in [3_u64, 99, 2024] {
        let mut rng = StdRng::seed_from_u64(seed);
        let backend = RecordingBackend::new(SCREEN);
        let mut wm = WindowManager::new(&session_config(), backend).unwrap();
        let mut next_window: WindowId = 1;

        for step in 0..400 {
            let windows: Vec<WindowId> =
                wm.registry().clients().map(|(_, client)| client.window).collect();
            let roll = rng.random_range(0..12);
            if windows.is_empty() || roll < 3 {
                let transient_for = (!windows.is_empty() && rng.random_bool(0.3))
                    .then(|| windows[rng.random_range(0..windows.len())]);
                let class = if rng.random_bool(0.3) { "pinned" } else { "app" };
                let attributes = WindowAttributes {
                    window: next_window,
                    geometry: Rect::new(10, 10, 400, 300),
                    class: class.to_string(),
                    transient_for,
                    ..WindowAttributes::default()
                };
                next_window += 1;
                wm.handle_event(ProtocolEvent::MapRequest { attributes });
            } else if roll < 4 {
                let window = windows[rng.random_range(0..windows.len())];
                wm.handle_event(ProtocolEvent::DestroyNotify { window });
            } else if roll < 5 {
                let window = windows[rng.random_range(0..windows.len())];
                let event = if rng.random_bool(0.5) {
                    ProtocolEvent::UrgencyHint { window, urgent: rng.random_bool(0.6) }
                } else {
                    ProtocolEvent::StateRequest {
                        window,
                        state: NetState::DemandsAttention,
                        action: ToggleAction::Toggle,
                    }
                };
                wm.handle_event(event);
            } else {
                let applied = wm.handle_command(random_command(&mut rng));
                let activated = applied.iter().any(|kind| {
                    matches!(kind, RecordKind::WorkspaceActivate | RecordKind::ContextActivate)
                });
                if activated {
                    let registry = wm.registry();
                    let has_live = registry.active_workspace().is_some_and(|ws| !ws.live.is_empty());
                    assert_eq!(
                        registry.focused().is_some(),
                        has_live,
                        "seed {seed}, step {step}: focus after activation"
                    );
                }
            }

            assert!(!wm.registry().has_pending_changes());
            if let Err(violation) = wm.registry().check_consistency() {
                panic!("seed {seed}, step {step}: {violation}");
            }
        }
    }
}

#[test]
fn test_transient_follows_parent_despite_rule_target() {
    let mut wm = WindowManager::new(&session_config(), RecordingBackend::new(SCREEN)).unwrap();
    let parent = WindowAttributes {
        window: 1,
        class: "app".to_string(),
        ..WindowAttributes::default()
    };
    wm.handle_event(ProtocolEvent::MapRequest { attributes: parent });
    let child = WindowAttributes {
        window: 2,
        class: "pinned".to_string(),
        transient_for: Some(1),
        ..WindowAttributes::default()
    };
    wm.handle_event(ProtocolEvent::MapRequest { attributes: child });

    let parent = wm.registry().win_client(1).unwrap();
    let child = wm.registry().win_client(2).unwrap();
    let home = wm.registry().client_user_workspace(parent);
    assert_eq!(wm.registry().client_user_workspace(child), home);

    assert!(wm.registry_mut().client_to_workspace(parent, 3));
    wm.process_queued_changes();
    let moved = wm.registry().client_user_workspace(parent);
    assert_ne!(moved, home);
    assert_eq!(wm.registry().client_user_workspace(child), moved);
    assert!(wm.registry().check_consistency().is_ok());
}

#[test]
fn test_urgent_sticky_client_across_workspace_switches() {
    let mut wm = WindowManager::new(&config(), RecordingBackend::new(SCREEN)).unwrap();
    let attributes = WindowAttributes { window: 1, ..WindowAttributes::default() };
    wm.handle_event(ProtocolEvent::MapRequest { attributes });
    wm.handle_event(ProtocolEvent::UrgencyHint { window: 1, urgent: true });
    wm.handle_command(Command::Sticky);
    wm.handle_command(Command::Workspace { index: 3 });
    assert!(wm.registry().focused().is_some());
    wm.handle_command(Command::Sticky);
    assert!(wm.registry().check_consistency().is_ok());

    wm.handle_event(ProtocolEvent::DestroyNotify { window: 1 });
    let context = wm.registry().context(0).unwrap();
    assert!(context.workspaces().iter().all(|ws| ws.urgent_count == 0));
    assert!(wm.registry().check_consistency().is_ok());
}

#[test]
fn test_workspace_activation_focuses_client_sent_there() {
    let mut wm = WindowManager::new(&config(), RecordingBackend::new(SCREEN)).unwrap();
    for window in 1..=2 {
        let attributes = WindowAttributes { window, ..WindowAttributes::default() };
        wm.handle_event(ProtocolEvent::MapRequest { attributes });
    }
    wm.handle_command(Command::SendToWorkspace { index: 2 });
    wm.handle_command(Command::SendToWorkspace { index: 2 });
    assert_eq!(wm.registry().focused(), None);

    wm.handle_command(Command::Workspace { index: 2 });
    assert!(wm.registry().focused().is_some());
    assert!(wm.registry().check_consistency().is_ok());
}

// ============================================================================
// Ledger order
// ============================================================================

#[test]
fn test_consumer_observes_records_in_issue_order() {
    let backend = RecordingBackend::new(SCREEN);
    let mut wm = WindowManager::new(&config(), backend).unwrap();
    for window in 1..=3 {
        let attributes = WindowAttributes { window, ..WindowAttributes::default() };
        wm.handle_event(ProtocolEvent::MapRequest { attributes });
    }
    let a = wm.registry().win_client(1).unwrap();

    let registry = wm.registry_mut();
    registry.set_layout(LayoutMode::Grid);
    registry.set_urgent(a, ToggleAction::Add);
    registry.adjust_gap(2);
    registry.change_active_workspace(1, false);
    registry.change_active_context(1);

    let issued: Vec<RecordKind> = registry.pending_changes().collect();
    assert_eq!(
        issued,
        vec![
            RecordKind::Arrange,
            RecordKind::Urgent,
            RecordKind::Arrange,
            RecordKind::WorkspaceActivate,
            RecordKind::Focus,
            RecordKind::ContextActivate,
        ]
    );
    assert_eq!(wm.process_queued_changes(), issued);
    assert!(wm.process_queued_changes().is_empty());
}

// ============================================================================
// Toggle pairing and mutual exclusion
// ============================================================================

#[test]
fn test_double_toggle_restores_flags_and_geometry() {
    type Setter = fn(&mut Registry, ClientId, ToggleAction) -> bool;
    let setters: [(&str, Setter); 4] = [
        ("fullscreen", Registry::set_fullscreen),
        ("above", Registry::set_above),
        ("below", Registry::set_below),
        ("disowned", Registry::set_disowned),
    ];

    for (name, set) in setters {
        let mut registry = registry();
        let a = add(&mut registry, 1);
        add(&mut registry, 2);
        registry.arrange(registry.visible_workspace_id());
        let before = registry.client(a).unwrap().clone();

        assert!(set(&mut registry, a, ToggleAction::Toggle), "{name}: first toggle");
        assert_ne!(registry.client(a).unwrap().flags, before.flags, "{name}: flag unchanged");
        assert!(set(&mut registry, a, ToggleAction::Toggle), "{name}: second toggle");

        let after = registry.client(a).unwrap();
        assert_eq!(after.flags, before.flags, "{name}: flags");
        assert_eq!(after.geometry, before.geometry, "{name}: geometry");
        assert_eq!(after.float_geometry, before.float_geometry, "{name}: floating geometry");
        assert!(!registry.holds_snapshot(a), "{name}: snapshot left behind");
        assert!(registry.check_consistency().is_ok());
    }
}

#[test]
fn test_above_and_below_are_mutually_exclusive() {
    let mut registry = registry();
    let a = add(&mut registry, 1);

    registry.set_above(a, ToggleAction::Add);
    registry.set_below(a, ToggleAction::Add);
    let flags = registry.client(a).unwrap().flags;
    assert!(!flags.above && flags.below);

    registry.set_above(a, ToggleAction::Add);
    let flags = registry.client(a).unwrap().flags;
    assert!(flags.above && !flags.below);
}

// ============================================================================
// Stacking
// ============================================================================

#[test]
fn test_stacking_order_ignores_insertion_order() {
    let orders: [[usize; 6]; 3] = [[0, 1, 2, 3, 4, 5], [5, 4, 3, 2, 1, 0], [2, 5, 0, 3, 1, 4]];

    for order in orders {
        let mut registry = registry();
        let mut frames = [0; 6];
        for (position, &kind) in order.iter().enumerate() {
            let window = u32::try_from(position).unwrap() + 1;
            let id = add(&mut registry, window);
            frames[kind] = registry.client(id).unwrap().frame;
            match kind {
                0 => registry.set_disowned(id, ToggleAction::Add),
                1 => registry.set_above(id, ToggleAction::Add),
                2 => registry.set_fullscreen(id, ToggleAction::Add),
                3 => registry.set_below(id, ToggleAction::Add),
                4 => {
                    registry.client_mut(id).unwrap().flags.floating = true;
                    true
                }
                _ => true,
            };
        }
        let stack = registry.stack_mut();
        stack.add(900, Layer::Notification, Rect::zero());
        stack.add(901, Layer::Above, Rect::zero());
        stack.add(902, Layer::Dock, Rect::zero());
        stack.add(903, Layer::Below, Rect::zero());
        stack.add(904, Layer::Desktop, Rect::zero());

        let [disowned, above, fullscreen, below, floating, normal] = frames;
        assert_eq!(
            registry.stacking_order(),
            vec![
                900, fullscreen, 901, above, floating, disowned, normal, 902, below, 903, 904
            ],
            "insertion order {order:?}"
        );
    }
}
