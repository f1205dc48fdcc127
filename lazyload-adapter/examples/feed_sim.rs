use std::cell::Cell;
use std::rc::Rc;

use lazyload::{Controller, ControllerOptions, Element, LoadError, Page, Slot, Viewport};
use lazyload_adapter::{BarrierStatus, Block, Feed, ScrollContainer, TaskQueue, deferred};

const FIRST: [&str; 6] = ["Ada", "Brook", "Cyrus", "Dana", "Emil", "Farah"];
const LAST: [&str; 5] = ["Lindqvist", "Okafor", "Moreau", "Tanaka", "Silva"];

fn main() {
    // Example: an infinite list of users rendered into a 300-row window.
    //
    // A host would:
    // - lay out the loaded rows and move the sentinel after the last one
    // - forward scroll events to the viewport
    // - run queued tasks from its event loop
    let page_size = 20;
    let total = 110u64;
    let row = 12.0;

    let queue = TaskQueue::new();
    let window = ScrollContainer::window(300.0);
    let sentinel = Block::new(0.0, None);
    let feed: Feed<String> = Feed::new();

    // The third page fails once, like a flaky network.
    let flaked = Cell::new(false);
    let fetch = move |offset: u64| -> Result<Page<String>, LoadError> {
        let page = offset + 1;
        if page == 3 && !flaked.replace(true) {
            return Err(LoadError::failed("Loading error!"));
        }
        let start = offset * page_size as u64;
        let end = (start + page_size as u64).min(total);
        let users = (start..end.max(start))
            .map(|i| {
                let first = FIRST[i as usize % FIRST.len()];
                let last = LAST[i as usize % LAST.len()];
                format!("{first} {last}")
            })
            .collect();
        Ok(Page::new(page, users))
    };

    let options = ControllerOptions::new(deferred(&queue, fetch), queue.clone())
        .with_page_size(page_size)
        .with_threshold(300.0)
        .with_viewport(Slot::attached(window.clone() as Rc<dyn Viewport>))
        .with_sentinel(Slot::attached(sentinel.clone() as Rc<dyn Element>));
    let controller = Controller::new(feed.bind(options));
    controller.enable().expect("controller is alive");

    let relayout = || {
        let height = feed.item_count() as f64 * row;
        sentinel.set_offset_top(height);
        window.set_content_extent(height + row);
    };

    for turn in 0..200 {
        if queue.is_empty() {
            match feed.status() {
                BarrierStatus::Failed(message) => {
                    println!("turn={turn} barrier shows {message:?}; retrying");
                    controller.trigger().expect("controller is alive");
                }
                BarrierStatus::Hidden if feed.is_finished() => break,
                _ => {
                    let off = window.scroll_by(120.0);
                    println!("turn={turn} scrolled to {off}");
                }
            }
            continue;
        }
        queue.run_turn();
        relayout();
        println!(
            "turn={turn} items={} offset={} status={:?}",
            feed.item_count(),
            feed.offset(),
            feed.status()
        );
    }

    feed.for_each_item(|index, user| {
        if index % 25 == 0 {
            println!("{index}. {user}");
        }
    });
    println!("done: {:?}", controller.snapshot());
}
