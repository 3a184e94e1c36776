use menu_pagination::drag::{DragEntity, DropTarget};
use menu_pagination::*;
use std::time::{Duration, Instant};

const SETTLE: Duration = Duration::from_millis(400);

fn open(document: Document, template: Template) -> EditingSession {
    EditingSession::new(document, template, SessionOptions::default()).unwrap()
}

/// Poll once to arm pending work and again once it is due
fn settle(session: &mut EditingSession, now: Instant, measurer: &impl Measure) -> SessionEvents {
    session.poll(now, measurer);
    session.poll(now + SETTLE, measurer)
}

#[test]
fn test_drag_category_onto_another_page_appends_it() {
    let template = Template::classic();
    let mut document = Document::for_template(&template).unwrap();
    let p1 = document.pages()[0].id;
    let p2 = document.create_page(&template).unwrap();
    let starters = document.create_category("Starters");
    let mains = document.create_category("Mains");
    let desserts = document.create_category("Desserts");
    document.assign_category(starters, Some(p1)).unwrap();
    document.assign_category(mains, Some(p1)).unwrap();
    document.assign_category(desserts, Some(p2)).unwrap();

    let mut session = open(document, template);
    let mut measurer = StackedHeights::new(0.0, 0.0);
    measurer.set_category(mains, 2_000.0);

    let t0 = Instant::now();
    settle(&mut session, t0, &measurer);
    assert_eq!(session.overflow().keys().copied().collect::<Vec<_>>(), vec![0]);

    session.start_drag(DragEntity::Category(mains));
    session.drag_over(Some(DropTarget::Page(p2)));
    session.drop_drag();

    let doc = session.document();
    assert_eq!(doc.page(p1).unwrap().category_ids, vec![starters]);
    assert_eq!(doc.page(p2).unwrap().category_ids, vec![desserts, mains]);

    // The next pass looks at both pages again
    let events = settle(&mut session, t0 + Duration::from_secs(1), &measurer);
    assert_eq!(events.full_passes, 1);
    assert!(events.overflow_changed);
    assert_eq!(session.overflow().keys().copied().collect::<Vec<_>>(), vec![1]);
}

/// Active page holds "Starters"; one more item pushes it 15 units over
fn overflowing_session() -> (EditingSession, StackedHeights, CategoryId, Instant) {
    let template = Template::classic();
    let page_height = template.page_height_px();
    let document = Document::for_template(&template).unwrap();
    let mut session = open(document, template);

    let starters = session.create_category_on_active_page("Starters").unwrap();
    let mut measurer = StackedHeights::new(0.0, 15.0);
    measurer.set_category(starters, page_height);

    let t0 = Instant::now();
    let events = settle(&mut session, t0, &measurer);
    assert!(events.prompt.is_none());

    session.add_item(starters, NewItem::new("Soup", 6.5)).unwrap();
    (session, measurer, starters, t0 + Duration::from_secs(1))
}

#[test]
fn test_adding_item_past_action_threshold_prompts() {
    let (mut session, measurer, starters, now) = overflowing_session();

    let events = settle(&mut session, now, &measurer);
    let prompt = events.prompt.expect("expected a resolution prompt");
    assert_eq!(prompt.category_id, starters);
    assert_eq!(prompt.category_name, "Starters");
    assert_eq!(prompt.page_number, 1);
    assert_eq!(prompt.overflow_amount, 15);
    assert!(prompt.available_target_pages.is_empty());
    assert_eq!(session.pending_resolution(), Some(&prompt));
}

#[test]
fn test_create_new_page_and_move() {
    let (mut session, measurer, starters, now) = overflowing_session();
    settle(&mut session, now, &measurer);
    let original = session.document().pages()[0].id;

    let outcome = session.resolve(ResolutionChoice::CreateNewAndMove).unwrap();

    let doc = session.document();
    assert_eq!(doc.pages().len(), 2);
    let new_page = &doc.pages()[1];
    assert_eq!(Some(new_page.id), outcome.destination);
    assert_eq!(new_page.category_ids, vec![starters]);
    assert_eq!(new_page.variant_id, VariantId::from("body"));
    assert!(!doc.page(original).unwrap().contains(starters));
    assert_eq!(session.active_page(), 1);
    assert!(session.pending_resolution().is_none());

    // A second answer to the same prompt is refused
    assert!(matches!(
        session.resolve(ResolutionChoice::Keep),
        Err(MenuError::NoPendingResolution)
    ));
}

#[test]
fn test_category_over_category_on_same_page_is_array_move() {
    let template = Template::classic();
    let mut document = Document::for_template(&template).unwrap();
    let page = document.pages()[0].id;
    let c = document.create_category("C");
    let x = document.create_category("X");
    let d = document.create_category("D");
    for id in [c, x, d] {
        document.assign_category(id, Some(page)).unwrap();
    }

    let mut session = open(document, template);
    session.start_drag(DragEntity::Category(c));
    session.drag_over(Some(DropTarget::Category(d)));
    assert_eq!(session.document().pages()[0].category_ids, vec![x, d, c]);
    session.drop_drag();
    assert_eq!(session.document().pages()[0].category_ids, vec![x, d, c]);
}

#[test]
fn test_removed_variant_is_remapped_without_losing_categories() {
    let template = Template::classic();
    let mut document = Document::new("classic");
    let cover = document.create_page_with_variant(VariantId::from("cover"));
    let starters = document.create_category("Starters");
    let mains = document.create_category("Mains");
    document.assign_category(starters, Some(cover)).unwrap();
    document.assign_category(mains, Some(cover)).unwrap();

    let mut session = open(document, template.clone());

    let mut edited = template;
    edited.variants.retain(|variant| variant.id.as_str() != "cover");
    let report = session.replace_template(edited).unwrap();

    assert_eq!(report.remapped_pages, vec![cover]);
    let page = session.document().page(cover).unwrap();
    assert_eq!(page.variant_id, VariantId::from("body"));
    assert_eq!(page.category_ids, vec![starters, mains]);
}

#[test]
fn test_interval_and_debounce_in_same_window_measure_current_state() {
    let template = Template::classic();
    let mut document = Document::for_template(&template).unwrap();
    let page = document.pages()[0].id;
    let big = document.create_category("Big");
    document.assign_category(big, Some(page)).unwrap();

    let mut session = open(document, template);
    let mut measurer = StackedHeights::new(0.0, 0.0);
    measurer.set_category(big, 2_000.0);

    let t0 = Instant::now();
    session.start_timers(t0);
    settle(&mut session, t0, &measurer);
    assert!(session.overflow().contains_key(&0));

    // Unassign the category just before the interval tick; the debounce is
    // armed 30ms before the tick and fires after it
    session.assign_category(big, None).unwrap();
    session.poll(t0 + Duration::from_millis(1_970), &measurer);
    let events = session.poll(t0 + Duration::from_millis(2_000), &measurer);
    assert_eq!(events.full_passes, 1);
    assert!(session.overflow().is_empty());

    let events = session.poll(t0 + Duration::from_millis(2_370), &measurer);
    assert_eq!(events.full_passes, 1);
    assert!(!events.overflow_changed);

    let mut fresh = OverflowDetector::new(session.thresholds());
    let ctx = RenderContext::new(session.document(), session.template());
    assert_eq!(fresh.recompute(&ctx, &measurer), session.overflow());
}
