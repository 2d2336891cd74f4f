//! Proxy lifecycle integration: attachment discovery, deferred updates,
//! teardown paths, and isolation across requesters and hosts.

use std::cell::Cell;
use std::rc::Rc;

use rstest::rstest;

use proscenium_client::{Client, LifecycleState, Placeholder, Placement};
use proscenium_core::{Portal, Provider, SequentialKeys, Stage};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

struct Tooltip;

impl Portal for Tooltip {
    type Props = TooltipProps;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TooltipProps {
    text: String,
}

struct Modal;

impl Portal for Modal {
    type Props = ModalProps;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ModalProps {
    title: String,
}

struct Panel;

impl Portal for Panel {
    type Props = PanelProps;
}

/// Props that own another live proxy; the badge tears down with the panel.
struct PanelProps {
    heading: &'static str,
    badge: Option<Placeholder<Tooltip, &'static str>>,
}

struct CountingProvider;

impl Provider for CountingProvider {
    type Props = Rc<Cell<u32>>;

    fn mount(counter: Rc<Cell<u32>>) -> Self {
        counter.set(counter.get() + 1);
        CountingProvider
    }

    fn update(&mut self, _counter: Rc<Cell<u32>>) {}
}

fn tip(text: &str) -> TooltipProps {
    TooltipProps { text: text.into() }
}

fn client_for<C: Portal>(stage: &Stage<&'static str>) -> Client<C, &'static str> {
    Client::new(stage.scope())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// 1. Mount, update, unmount
// ---------------------------------------------------------------------------

#[test]
fn mount_discovers_its_target_and_registers() {
    init_tracing();
    let stage: Stage<&'static str> = Stage::new();
    let client = client_for::<Tooltip>(&stage);

    let mut proxy = client.instance(tip("hi"));
    assert_eq!(proxy.state(), LifecycleState::Created);
    assert!(stage.is_empty());

    proxy.attach(&Placement::under("N1"));
    assert_eq!(proxy.state(), LifecycleState::Registered);

    let pass = stage.render();
    assert_eq!(pass.len(), 1);
    let instruction = &pass.instructions()[0];
    assert_eq!(instruction.key(), proxy.key());
    assert_eq!(*instruction.target(), "N1");
    assert!(instruction.component().is::<Tooltip>());
    assert_eq!(instruction.props_as::<TooltipProps>(), Some(&tip("hi")));
}

#[test]
fn prop_changes_forward_while_registered() {
    let stage: Stage<&'static str> = Stage::new();
    let client = client_for::<Tooltip>(&stage);
    let mut proxy = client.instance(tip("hi"));
    proxy.attach(&Placement::under("N1"));

    proxy.set_props(tip("bye"));

    assert_eq!(
        stage.render().instructions()[0].props_as::<TooltipProps>(),
        Some(&tip("bye"))
    );
    assert_eq!(stage.generation(), 2, "register plus one update");
}

#[test]
fn updates_before_attachment_defer_into_the_initial_payload() {
    let stage: Stage<&'static str> = Stage::new();
    let client = client_for::<Tooltip>(&stage);
    let mut proxy = client.instance(tip("first"));

    proxy.set_props(tip("second"));
    proxy.set_props(tip("third"));
    assert!(stage.is_empty(), "nothing registers before attachment");

    proxy.attach(&Placement::under("N1"));

    assert_eq!(
        stage.render().instructions()[0].props_as::<TooltipProps>(),
        Some(&tip("third")),
        "the latest pending payload wins"
    );
    assert_eq!(stage.generation(), 1, "deferred updates issue no mutations");
}

#[test]
fn detached_placement_keeps_the_instance_waiting() {
    let stage: Stage<&'static str> = Stage::new();
    let client = client_for::<Tooltip>(&stage);
    let mut proxy = client.instance(tip("hi"));

    proxy.attach(&Placement::detached());
    assert_eq!(proxy.state(), LifecycleState::AwaitingAttachment);
    assert!(stage.is_empty());

    // A later placement with a real parent completes the registration.
    proxy.attach(&Placement::under("N1"));
    assert_eq!(proxy.state(), LifecycleState::Registered);
    assert_eq!(stage.len(), 1);
}

#[rstest]
#[case::explicit_detach(true)]
#[case::implicit_drop(false)]
fn teardown_removes_the_entry_exactly_once(#[case] explicit: bool) {
    let stage: Stage<&'static str> = Stage::new();
    let client = client_for::<Tooltip>(&stage);
    let mut proxy = client.instance(tip("hi"));
    proxy.attach(&Placement::under("N1"));
    assert_eq!(stage.len(), 1);

    if explicit {
        proxy.detach();
        proxy.detach();
        assert_eq!(proxy.state(), LifecycleState::Removed);
    }
    drop(proxy);

    assert!(stage.is_empty());
    assert_eq!(stage.generation(), 2, "one register and one remove in total");
}

#[test]
fn teardown_cascades_through_payload_owned_proxies() {
    let stage: Stage<&'static str> = Stage::new();
    let tooltips = client_for::<Tooltip>(&stage);
    let panels = client_for::<Panel>(&stage);

    let mut badge = tooltips.instance(tip("new"));
    badge.attach(&Placement::under("corner"));
    let badge_key = badge.key();

    let mut panel = panels.instance(PanelProps {
        heading: "overview",
        badge: Some(badge),
    });
    panel.attach(&Placement::under("sidebar"));
    assert_eq!(stage.len(), 2);

    {
        let pass = stage.render();
        let instruction = pass
            .iter()
            .find(|i| i.component().is::<Panel>())
            .expect("panel entry");
        let props = instruction.props_as::<PanelProps>().expect("typed panel props");
        assert_eq!(props.heading, "overview");
        assert!(props.badge.is_some(), "the payload carries the owned proxy");
    }

    // Tearing the panel down drops its payload; the owned badge proxy
    // deregisters itself from inside that drop.
    panel.detach();

    assert!(stage.is_empty());
    assert!(!stage.contains(badge_key));
    assert_eq!(stage.generation(), 4, "two registers, two removes");
}

#[test]
fn unmounting_before_attachment_never_registers() {
    let stage: Stage<&'static str> = Stage::new();
    let client = client_for::<Tooltip>(&stage);

    let mut proxy = client.instance(tip("hi"));
    proxy.set_props(tip("still unseen"));
    drop(proxy);

    let mut waiting = client.instance(tip("hi"));
    waiting.attach(&Placement::detached());
    drop(waiting);

    assert!(stage.is_empty());
    assert_eq!(stage.generation(), 0, "no register call was ever issued");
}

#[test]
fn a_second_attach_is_ignored() {
    let stage: Stage<&'static str> = Stage::new();
    let client = client_for::<Tooltip>(&stage);
    let mut proxy = client.instance(tip("hi"));

    proxy.attach(&Placement::under("N1"));
    proxy.attach(&Placement::under("N2"));

    let pass = stage.render();
    assert_eq!(pass.len(), 1);
    assert_eq!(*pass.instructions()[0].target(), "N1", "the first target sticks");
    assert_eq!(stage.generation(), 1);
}

#[test]
fn keys_stay_stable_across_prop_changes() {
    let stage: Stage<&'static str> = Stage::new();
    let client = client_for::<Tooltip>(&stage);
    let mut proxy = client.instance(tip("a"));
    let minted = proxy.key();

    proxy.set_props(tip("b"));
    proxy.attach(&Placement::under("N1"));
    proxy.set_props(tip("c"));

    assert_eq!(proxy.key(), minted);
    assert_eq!(stage.render().instructions()[0].key(), minted);
}

// ---------------------------------------------------------------------------
// 2. Isolation
// ---------------------------------------------------------------------------

#[test]
fn requesters_of_different_components_stay_isolated() {
    let stage: Stage<&'static str> = Stage::new();
    let tooltips = client_for::<Tooltip>(&stage);
    let modals = client_for::<Modal>(&stage);

    let mut tooltip = tooltips.instance(tip("hover"));
    let mut modal = modals.instance(ModalProps {
        title: "settings".into(),
    });
    tooltip.attach(&Placement::under("N1"));
    modal.attach(&Placement::under("N2"));
    assert_eq!(stage.len(), 2);

    tooltip.set_props(tip("still hovering"));

    let pass = stage.render();
    let modal_instruction = pass
        .iter()
        .find(|i| i.component().is::<Modal>())
        .expect("modal entry");
    assert_eq!(
        modal_instruction.props_as::<ModalProps>().map(|p| p.title.as_str()),
        Some("settings"),
        "a neighbour's update must not bleed over"
    );

    modal.detach();
    assert_eq!(stage.len(), 1);
    assert!(stage.contains(tooltip.key()));
}

#[test]
fn provider_mounts_once_for_many_placeholders() {
    let mounts = Rc::new(Cell::new(0u32));
    let stage: Stage<&'static str, CountingProvider> =
        Stage::with_provider(Rc::clone(&mounts));
    let client: Client<Tooltip, _> = Client::new(stage.scope());

    let mut proxies: Vec<_> = ["N1", "N2", "N3"]
        .into_iter()
        .map(|node| {
            let mut proxy = client.instance(tip(node));
            proxy.attach(&Placement::under(node));
            proxy
        })
        .collect();
    assert_eq!(stage.len(), 3);

    proxies.pop();
    assert_eq!(stage.len(), 2);
    assert_eq!(mounts.get(), 1, "one provider instance for 0, 1, and N entries");
}

#[test]
fn hosts_share_nothing_even_with_a_common_key_source() {
    let shared = Rc::new(SequentialKeys::new());
    let left: Stage<&'static str> = Stage::new();
    let right: Stage<&'static str> = Stage::new();
    let left_client: Client<Tooltip, _> =
        Client::with_key_source(left.scope(), Rc::clone(&shared));
    let right_client: Client<Tooltip, _> =
        Client::with_key_source(right.scope(), Rc::clone(&shared));

    let mut on_left = left_client.instance(tip("left"));
    let mut on_right = right_client.instance(tip("right"));
    assert_ne!(on_left.key(), on_right.key(), "the shared source still advances");

    on_left.attach(&Placement::under("L"));
    on_right.attach(&Placement::under("R"));
    assert_eq!(left.len(), 1);
    assert_eq!(right.len(), 1);

    on_left.detach();
    assert!(left.is_empty());
    assert_eq!(right.len(), 1, "removal on one host never leaks to another");
}

// ---------------------------------------------------------------------------
// 3. Host teardown
// ---------------------------------------------------------------------------

#[test]
fn dropped_stage_silences_every_later_call() {
    let stage: Stage<&'static str> = Stage::new();
    let client = client_for::<Tooltip>(&stage);

    let mut registered = client.instance(tip("live"));
    registered.attach(&Placement::under("N1"));
    let mut unattached = client.instance(tip("pending"));

    drop(stage);

    registered.set_props(tip("into the void"));
    registered.detach();

    unattached.attach(&Placement::under("N2"));
    assert_eq!(unattached.state(), LifecycleState::Removed);
    unattached.set_props(tip("also void"));
    drop(unattached);
}
