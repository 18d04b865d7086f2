use super::*;

const PAGE: usize = 4096;
const MAX: usize = PAGE * 64;

#[test]
fn allocate_then_deallocate_returns_address_for_reuse() {
    let mut pm = PageManager::new(MAX, PAGE);
    let p1 = pm.allocate_page();
    let idx1 = pm.page_index(p1);
    pm.deallocate_page(p1);
    let p2 = pm.allocate_page();
    assert_eq!(pm.page_index(p2), idx1, "freed page should be reused before extending the frontier");
}

#[test]
fn frontier_advances_when_no_free_pages() {
    let mut pm = PageManager::new(MAX, PAGE);
    let p1 = pm.allocate_page();
    let p2 = pm.allocate_page();
    assert_ne!(pm.page_index(p1), pm.page_index(p2));
    assert_eq!(pm.page_index(p1), 0);
    assert_eq!(pm.page_index(p2), 1);
}

#[test]
fn page_of_masks_to_page_boundary() {
    let mut pm = PageManager::new(MAX, PAGE);
    let p = pm.allocate_page();
    let inner = unsafe { p.add(37) };
    assert_eq!(pm.page_of(inner), p);
}

#[test]
fn reuse_prefers_lowest_index() {
    let mut pm = PageManager::new(MAX, PAGE);
    let p0 = pm.allocate_page();
    let p1 = pm.allocate_page();
    let p2 = pm.allocate_page();
    pm.deallocate_page(p1);
    pm.deallocate_page(p2);
    let reused = pm.allocate_page();
    assert_eq!(pm.page_index(reused), pm.page_index(p1));
    let _ = p0;
}
