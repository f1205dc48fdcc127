use crate::*;

use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use lazyload::{
    Controller, ControllerOptions, Element, LoadError, Page, Phase, Slot, Viewport, geometry,
};

#[test]
fn task_queue_defers_tasks_queued_during_a_turn() {
    let q = TaskQueue::new();
    let order: Rc<RefCell<Vec<u32>>> = Rc::default();

    {
        let q2 = q.clone();
        let order = Rc::clone(&order);
        q.push(move || {
            order.borrow_mut().push(1);
            let order = Rc::clone(&order);
            q2.push(move || order.borrow_mut().push(3));
        });
    }
    {
        let order = Rc::clone(&order);
        q.push(move || order.borrow_mut().push(2));
    }

    assert_eq!(q.len(), 2);
    assert_eq!(q.run_turn(), 2);
    assert_eq!(*order.borrow(), vec![1, 2]);
    assert_eq!(q.len(), 1);

    assert_eq!(q.run_until_idle(10), 1);
    assert_eq!(*order.borrow(), vec![1, 2, 3]);
    assert!(q.is_empty());
    assert_eq!(q.run_turn(), 0);
}

#[test]
fn run_turn_counts_only_tasks_it_ran() {
    let q = TaskQueue::new();
    let nested = Rc::new(Cell::new(0usize));
    {
        let q2 = q.clone();
        let nested = Rc::clone(&nested);
        q.push(move || nested.set(q2.run_turn()));
    }
    let ran_second = Rc::new(Cell::new(false));
    {
        let ran_second = Rc::clone(&ran_second);
        q.push(move || ran_second.set(true));
    }

    assert_eq!(q.run_turn(), 1);
    assert_eq!(nested.get(), 1);
    assert!(ran_second.get());
    assert!(q.is_empty());
}

#[test]
fn run_until_idle_respects_the_turn_limit() {
    let q = TaskQueue::new();
    fn requeue(q: &TaskQueue, count: Rc<Cell<u32>>) {
        let q2 = q.clone();
        q.push(move || {
            count.set(count.get() + 1);
            requeue(&q2, count);
        });
    }
    let count = Rc::new(Cell::new(0));
    requeue(&q, Rc::clone(&count));

    assert_eq!(q.run_until_idle(5), 5);
    assert_eq!(count.get(), 5);
    assert_eq!(q.len(), 1);
}

#[test]
fn scroll_container_clamps_and_notifies_on_change() {
    let c = ScrollContainer::new(0.0, None, 100.0);
    let hits = Rc::new(Cell::new(0u32));
    let id = {
        let hits = Rc::clone(&hits);
        c.subscribe(Rc::new(move || hits.set(hits.get() + 1)))
    };
    assert_eq!(c.subscriber_count(), 1);

    assert_eq!(c.scroll_to(-5.0), 0.0);
    assert_eq!(hits.get(), 0);

    assert_eq!(c.scroll_to(50.0), 50.0);
    assert_eq!(hits.get(), 1);

    c.set_content_extent(120.0);
    assert_eq!(c.max_scroll_offset(), Some(20.0));
    assert_eq!(c.scroll_offset(), 20.0);
    assert_eq!(c.scroll_by(100.0), 20.0);
    assert_eq!(hits.get(), 1);

    c.unsubscribe(id);
    c.unsubscribe(id);
    assert_eq!(c.subscriber_count(), 0);
    c.scroll_to(0.0);
    assert_eq!(hits.get(), 1);
}

#[test]
fn scroll_container_tolerates_unsubscribe_during_notification() {
    let c = ScrollContainer::new(0.0, None, 100.0);
    let slot: Rc<Cell<Option<lazyload::SubscriptionId>>> = Rc::default();
    let hits = Rc::new(Cell::new(0u32));
    let id = {
        let weak = Rc::downgrade(&c);
        let slot = Rc::clone(&slot);
        let hits = Rc::clone(&hits);
        c.subscribe(Rc::new(move || {
            hits.set(hits.get() + 1);
            if let (Some(c), Some(id)) = (weak.upgrade(), slot.get()) {
                c.unsubscribe(id);
            }
        }))
    };
    slot.set(Some(id));

    c.scroll_to(10.0);
    c.scroll_to(20.0);
    assert_eq!(hits.get(), 1);
    assert_eq!(c.subscriber_count(), 0);
}

#[test]
fn layout_tree_feeds_geometry() {
    let window = ScrollContainer::window(300.0);
    window.set_offset_top(999.0);
    let content = Block::new(40.0, None);
    let sentinel = Block::new(500.0, Some(content.clone() as Rc<dyn Element>));

    assert_eq!(window.offset_top(), Some(0.0));
    assert_eq!(geometry::gap(&*window, &*sentinel), 540.0);
    assert!(!geometry::is_sentinel_near(&*window, &*sentinel, 200.0));
    window.scroll_to(50.0);
    assert!(geometry::is_sentinel_near(&*window, &*sentinel, 200.0));

    let pane = ScrollContainer::new(100.0, Some(content.clone() as Rc<dyn Element>), 200.0);
    let inner = Block::new(260.0, Some(pane.clone() as Rc<dyn Element>));
    assert_eq!(geometry::gap(&*pane, &*inner), 260.0);
    assert_eq!(geometry::relative_offset(&*window, &*pane), 140.0);
}

fn people(total: u64, page_size: u64) -> impl Fn(u64) -> Result<Page<u64>, LoadError> + 'static {
    move |offset| {
        let start = offset * page_size;
        let end = (start + page_size).min(total);
        Ok(Page::new(offset + 1, (start..end.max(start)).collect()))
    }
}

struct List {
    controller: Controller<u64>,
    feed: Feed<u64>,
    queue: TaskQueue,
    window: Rc<ScrollContainer>,
    sentinel: Rc<Block>,
    row: f64,
}

impl List {
    fn new(fetch: impl Fn(u64) -> Result<Page<u64>, LoadError> + 'static, row: f64) -> Self {
        let queue = TaskQueue::new();
        let feed = Feed::new();
        let window = ScrollContainer::window(300.0);
        let sentinel = Block::new(0.0, None);

        let options = ControllerOptions::new(deferred(&queue, fetch), queue.clone())
            .with_page_size(20)
            .with_threshold(300.0)
            .with_viewport(Slot::attached(window.clone() as Rc<dyn Viewport>))
            .with_sentinel(Slot::attached(sentinel.clone() as Rc<dyn Element>));
        let controller = Controller::new(feed.bind(options));

        Self {
            controller,
            feed,
            queue,
            window,
            sentinel,
            row,
        }
    }

    /// Runs the event loop, re-laying out the list after every turn like a renderer would.
    fn settle(&self) {
        for _ in 0..100 {
            if self.queue.is_empty() {
                break;
            }
            self.queue.run_turn();
            let height = self.feed.item_count() as f64 * self.row;
            self.sentinel.set_offset_top(height);
            self.window.set_content_extent(height + 20.0);
        }
    }
}

#[test]
fn feed_loads_until_the_data_source_is_exhausted() {
    let list = List::new(people(45, 20), 10.0);
    list.controller.enable().unwrap();
    assert_eq!(list.feed.status(), BarrierStatus::Loading);

    list.settle();

    assert_eq!(list.feed.page_count(), 3);
    assert_eq!(list.feed.item_count(), 45);
    assert_eq!(list.feed.offset(), 3);
    assert!(list.feed.is_finished());
    assert_eq!(list.feed.status(), BarrierStatus::Hidden);
    assert!(list.controller.is_halted());
    assert_eq!(list.controller.phase(), Phase::Idle);

    let mut seen = Vec::new();
    list.feed.for_each_item(|i, item| {
        assert_eq!(i as u64, *item);
        seen.push(*item);
    });
    assert_eq!(seen.len(), 45);

    // Scrolling past the end does not load again.
    list.window.scroll_to(10_000.0);
    assert!(list.queue.is_empty());
}

#[test]
fn feed_waits_for_scroll_when_the_sentinel_is_far() {
    let list = List::new(people(100, 20), 30.0);
    list.controller.enable().unwrap();
    list.settle();

    // 20 rows * 30 = 600, not < 0 + 300 + 300.
    assert_eq!(list.feed.item_count(), 20);
    assert_eq!(list.feed.status(), BarrierStatus::Continue);
    assert!(!list.controller.is_halted());

    list.window.scroll_to(100.0);
    assert_eq!(list.feed.status(), BarrierStatus::Loading);
    list.settle();
    assert_eq!(list.feed.item_count(), 40);
}

#[test]
fn feed_reports_errors_and_resumes_on_trigger() {
    let fail = Rc::new(Cell::new(true));
    let fetch = {
        let fail = Rc::clone(&fail);
        let ok = people(30, 20);
        move |offset| {
            if fail.get() {
                Err(LoadError::failed("Loading error!"))
            } else {
                ok(offset)
            }
        }
    };
    let list = List::new(fetch, 10.0);
    list.controller.enable().unwrap();
    list.settle();

    assert_eq!(list.feed.status(), BarrierStatus::Failed("Loading error!".into()));
    assert!(list.feed.status().is_visible());
    assert_eq!(list.feed.item_count(), 0);

    fail.set(false);
    list.controller.trigger().unwrap();
    list.settle();
    assert_eq!(list.feed.item_count(), 30);
    assert!(list.feed.is_finished());
}

#[test]
fn feed_forwards_existing_callbacks() {
    let queue = TaskQueue::new();
    let feed = Feed::new();
    let started = Rc::new(Cell::new(0u32));
    let errors = Rc::new(Cell::new(0u32));

    let options = ControllerOptions::new(
        deferred(&queue, |_| -> Result<Page<u8>, LoadError> { Err("down".into()) }),
        queue.clone(),
    )
    .with_on_loading_started({
        let started = Rc::clone(&started);
        move || started.set(started.get() + 1)
    })
    .with_on_error({
        let errors = Rc::clone(&errors);
        move |_| errors.set(errors.get() + 1)
    });
    let controller = Controller::new(feed.bind(options));

    controller.enable().unwrap();
    queue.run_until_idle(10);
    assert_eq!(started.get(), 1);
    assert_eq!(errors.get(), 1);
    assert_eq!(feed.status(), BarrierStatus::Failed("down".into()));
}

#[test]
fn destroying_with_a_pending_deferred_load_is_quiet() {
    let list = List::new(people(100, 20), 10.0);
    list.controller.enable().unwrap();
    list.controller.destroy();
    list.settle();

    assert_eq!(list.feed.item_count(), 0);
    assert_eq!(list.feed.status(), BarrierStatus::Loading);
    assert_eq!(list.window.subscriber_count(), 0);
}
