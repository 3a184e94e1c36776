use menu_pagination::drag::{DragEntity, DropTarget};
use menu_pagination::*;
use std::collections::BTreeSet;

/// Three pages and a pool: P1 [a, b, c], P2 [d], P3 [], pool [e, f]
fn fixture() -> (EditingSession, Vec<PageId>, Vec<CategoryId>) {
    let template = Template::classic();
    let mut document = Document::for_template(&template).unwrap();
    let mut pages = vec![document.pages()[0].id];
    pages.push(document.create_page(&template).unwrap());
    pages.push(document.create_page(&template).unwrap());

    let categories: Vec<CategoryId> = ["a", "b", "c", "d", "e", "f"]
        .iter()
        .map(|name| document.create_category(*name))
        .collect();
    for (index, category) in categories.iter().take(3).enumerate() {
        document.assign_category(*category, Some(pages[0])).unwrap();
        document
            .add_item(*category, NewItem::new(format!("item {index}"), 1.0))
            .unwrap();
    }
    document.assign_category(categories[3], Some(pages[1])).unwrap();

    let session = EditingSession::new(document, template, SessionOptions::default()).unwrap();
    (session, pages, categories)
}

fn all_categories(document: &Document) -> BTreeSet<CategoryId> {
    document.reading_order().into_iter().collect()
}

/// Small deterministic generator so the walk is reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound
    }
}

#[test]
fn test_single_ownership_survives_random_drags() {
    let (mut session, pages, categories) = fixture();
    let expected = all_categories(session.document());
    let mut rng = Lcg(7);

    let mut targets: Vec<DropTarget> = pages.iter().map(|page| DropTarget::Page(*page)).collect();
    targets.extend(categories.iter().map(|c| DropTarget::Category(*c)));
    targets.extend(categories.iter().map(|c| DropTarget::CategoryItems(*c)));
    targets.push(DropTarget::Unassigned);
    targets.push(DropTarget::Page(PageId(9_999)));

    for _ in 0..200 {
        let dragged = categories[rng.next(categories.len())];
        session.start_drag(DragEntity::Category(dragged));
        for _ in 0..rng.next(6) {
            session.drag_over(Some(targets[rng.next(targets.len())]));
            assert!(session.document().is_consistent());
        }
        if rng.next(2) == 0 {
            session.drop_drag();
        } else {
            session.cancel_drag();
        }

        assert!(session.document().is_consistent());
        assert_eq!(all_categories(session.document()), expected);
        assert_eq!(session.document().pages().len(), 3);
    }
}

#[test]
fn test_items_stay_unique_under_random_item_drags() {
    let (mut session, _, categories) = fixture();
    let items: Vec<ItemId> = session
        .document()
        .categories()
        .iter()
        .flat_map(|category| category.items.iter().map(|item| item.id))
        .collect();
    let mut rng = Lcg(42);

    let mut targets: Vec<DropTarget> = items.iter().map(|item| DropTarget::Item(*item)).collect();
    targets.extend(categories.iter().map(|c| DropTarget::CategoryItems(*c)));

    for _ in 0..200 {
        session.start_drag(DragEntity::Item(items[rng.next(items.len())]));
        for _ in 0..rng.next(5) {
            session.drag_over(Some(targets[rng.next(targets.len())]));
        }
        session.drop_drag();

        let mut seen: Vec<ItemId> = session
            .document()
            .categories()
            .iter()
            .flat_map(|category| category.items.iter().map(|item| item.id))
            .collect();
        seen.sort();
        let mut expected = items.clone();
        expected.sort();
        assert_eq!(seen, expected);
    }
}

#[test]
fn test_item_hover_across_categories_inserts_at_hovered_index() {
    let template = Template::classic();
    let mut document = Document::for_template(&template).unwrap();
    let starters = document.create_category("Starters");
    let mains = document.create_category("Mains");
    let soup = document.add_item(starters, NewItem::new("Soup", 6.0)).unwrap();
    let steak = document.add_item(mains, NewItem::new("Steak", 24.0)).unwrap();
    let fish = document.add_item(mains, NewItem::new("Fish", 19.0)).unwrap();

    let mut session = EditingSession::new(document, template, SessionOptions::default()).unwrap();
    session.start_drag(DragEntity::Item(soup));
    session.drag_over(Some(DropTarget::Item(fish)));

    let ids = |session: &EditingSession, category| -> Vec<ItemId> {
        session
            .document()
            .category(category)
            .unwrap()
            .items
            .iter()
            .map(|item| item.id)
            .collect()
    };
    assert_eq!(ids(&session, mains), vec![steak, soup, fish]);

    // Dropping after a cross-category move leaves the order alone
    session.drop_drag();
    assert_eq!(ids(&session, mains), vec![steak, soup, fish]);
    assert!(ids(&session, starters).is_empty());
}

#[test]
fn test_item_reorder_within_category_happens_on_drop() {
    let template = Template::classic();
    let mut document = Document::for_template(&template).unwrap();
    let wines = document.create_category("Wines");
    let red = document.add_item(wines, NewItem::new("Red", 8.0)).unwrap();
    let white = document.add_item(wines, NewItem::new("White", 8.0)).unwrap();
    let rose = document.add_item(wines, NewItem::new("Rose", 8.0)).unwrap();

    let mut session = EditingSession::new(document, template, SessionOptions::default()).unwrap();
    let revision = session.revision();

    session.start_drag(DragEntity::Item(red));
    session.drag_over(Some(DropTarget::Item(rose)));
    assert_eq!(session.revision(), revision);

    session.drop_drag();
    let order: Vec<ItemId> = session
        .document()
        .category(wines)
        .unwrap()
        .items
        .iter()
        .map(|item| item.id)
        .collect();
    assert_eq!(order, vec![white, rose, red]);
    assert_eq!(session.revision(), revision + 1);
}

#[test]
fn test_move_round_trip_restores_order() {
    let (mut session, pages, categories) = fixture();
    let before = session.document().clone();
    let b = categories[1];

    session.assign_category(b, Some(pages[1])).unwrap();
    assert_ne!(session.document().pages(), before.pages());

    session.insert_category(b, pages[0], 1).unwrap();
    assert_eq!(session.document().pages(), before.pages());
}

#[test]
fn test_deleting_pages_keeps_categories() {
    let (mut session, pages, categories) = fixture();
    let expected = all_categories(session.document());

    session.delete_page(pages[0]).unwrap();
    assert_eq!(
        session.document().page(pages[1]).unwrap().category_ids,
        vec![categories[3], categories[0], categories[1], categories[2]]
    );
    session.delete_page(pages[2]).unwrap();

    // Only one page is left and categories exist
    assert!(matches!(session.delete_page(pages[1]), Err(MenuError::LastPage)));
    assert_eq!(session.document().pages().len(), 1);
    assert_eq!(all_categories(session.document()), expected);
    assert!(session.document().is_consistent());
}

#[test]
fn test_category_created_after_last_page_is_deleted_gets_a_page() {
    let template = Template::classic();
    let document = Document::for_template(&template).unwrap();
    let only = document.pages()[0].id;
    let mut session = EditingSession::new(document, template, SessionOptions::default()).unwrap();

    // An empty document may lose its last page
    session.delete_page(only).unwrap();
    assert!(session.document().pages().is_empty());

    let drinks = session.create_category("Drinks").unwrap();
    assert_eq!(session.document().pages().len(), 1);
    assert_eq!(session.active_page(), 0);
    assert_eq!(session.document().unassigned(), vec![drinks]);
    assert!(session.document().is_consistent());
}

#[test]
fn test_category_hover_on_other_page_inserts_at_hovered_index() {
    let (mut session, pages, categories) = fixture();
    let (a, d, f) = (categories[0], categories[3], categories[5]);
    session.assign_category(f, Some(pages[1])).unwrap();

    session.start_drag(DragEntity::Category(a));
    session.drag_over(Some(DropTarget::Category(f)));
    session.drop_drag();

    assert_eq!(session.document().page(pages[1]).unwrap().category_ids, vec![d, a, f]);
    assert_eq!(
        session.document().page(pages[0]).unwrap().category_ids,
        vec![categories[1], categories[2]]
    );
    assert!(session.document().is_consistent());
}

#[test]
fn test_pooled_category_hover_on_page_category_inserts_before_it() {
    let (mut session, pages, categories) = fixture();
    let (a, b, c, e) = (categories[0], categories[1], categories[2], categories[4]);

    session.start_drag(DragEntity::Category(e));
    session.drag_over(Some(DropTarget::CategoryItems(c)));
    session.drop_drag();

    assert_eq!(session.document().page(pages[0]).unwrap().category_ids, vec![a, b, e, c]);
    assert!(!session.document().unassigned().contains(&e));
    assert!(session.document().is_consistent());
}

#[test]
fn test_hover_over_pool_then_cancel_keeps_live_result() {
    let (mut session, _, categories) = fixture();
    let a = categories[0];

    session.start_drag(DragEntity::Category(a));
    session.drag_over(Some(DropTarget::Unassigned));
    session.cancel_drag();

    assert!(session.document().unassigned().contains(&a));
    assert!(session.document().locate_category(a).is_none());
}

#[test]
fn test_hit_testing_drives_hover() {
    use menu_pagination::drag::{Candidate, Rect};

    let (mut session, pages, categories) = fixture();
    let candidates = [
        Candidate::new(DropTarget::Page(pages[0]), Rect::new(0.0, 0.0, 200.0, 300.0)),
        Candidate::new(DropTarget::Page(pages[2]), Rect::new(0.0, 600.0, 200.0, 300.0)),
    ];

    assert_eq!(session.drag_over_rect(&Rect::new(0.0, 600.0, 200.0, 40.0), &candidates), None);

    session.start_drag(DragEntity::Category(categories[0]));
    let target = session.drag_over_rect(&Rect::new(0.0, 620.0, 200.0, 40.0), &candidates);
    assert_eq!(target, Some(DropTarget::Page(pages[2])));
    assert_eq!(
        session.document().page(pages[2]).unwrap().category_ids,
        vec![categories[0]]
    );
}

#[test]
fn test_document_json_round_trip() {
    let (session, _, _) = fixture();
    let json = serde_json::to_string(session.document()).unwrap();
    let loaded: Document = serde_json::from_str(&json).unwrap();
    assert_eq!(&loaded, session.document());

    // Ids keep counting from where the saved document stopped
    let mut loaded = loaded;
    let fresh = loaded.create_category("new");
    assert!(session.document().category(fresh).is_none());
}

#[test]
fn test_normalize_is_idempotent() {
    let template = Template::classic();
    let json = r#"{
        "template_id": "old",
        "categories": [{"id": 4, "name": "Drinks", "items": [{"id": 9, "name": "Tea", "price": 2.0}]}],
        "pages": [
            {"id": 1, "variant_id": "cover", "category_ids": [4, 4, 77]},
            {"id": 2, "variant_id": "retired", "category_ids": [4]}
        ]
    }"#;
    let mut document: Document = serde_json::from_str(json).unwrap();

    let report = document.normalize(&template).unwrap();
    assert_eq!(report.duplicates_removed, 2);
    assert_eq!(report.dangling_removed, 1);
    assert_eq!(report.remapped_pages, vec![PageId(2)]);
    assert_eq!(document.template_id(), "classic");

    let snapshot = document.clone();
    assert!(document.normalize(&template).unwrap().is_clean());
    assert_eq!(document, snapshot);

    // The allocator skips every id already in use
    let category = document.create_category("Coffee");
    assert!(category.0 > 9);
}

#[test]
fn test_empty_document_gets_a_page_when_opened() {
    let template = Template::bistro();
    let mut document = Document::new("bistro");
    document.create_category("Specials");

    let session = EditingSession::new(document, template, SessionOptions::default()).unwrap();
    assert_eq!(session.document().pages().len(), 1);
    assert_eq!(
        session.document().pages()[0].variant_id,
        VariantId::from("two-column")
    );
}
