// Example: minimal host wiring with a synchronous loader and a hand-driven task list.
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use lazyload::{
    Completion, Controller, ControllerOptions, Element, LoadError, ScrollHandler, Slot,
    SubscriptionId, Task, Viewport,
};

struct Window {
    scroll: Cell<f64>,
}

impl Element for Window {
    fn offset_top(&self) -> Option<f64> {
        Some(0.0)
    }
    fn offset_parent(&self) -> Option<&dyn Element> {
        None
    }
    fn is_root(&self) -> bool {
        true
    }
}

impl Viewport for Window {
    fn scroll_position(&self) -> Option<f64> {
        Some(self.scroll.get())
    }
    fn visible_extent(&self) -> Option<f64> {
        Some(400.0)
    }
    fn subscribe(&self, _: ScrollHandler) -> SubscriptionId {
        SubscriptionId(0)
    }
    fn unsubscribe(&self, _: SubscriptionId) {}
}

struct Barrier {
    top: Rc<Cell<f64>>,
}

impl Element for Barrier {
    fn offset_top(&self) -> Option<f64> {
        Some(self.top.get())
    }
    fn offset_parent(&self) -> Option<&dyn Element> {
        None
    }
}

fn main() {
    let tasks: Rc<RefCell<Vec<Task>>> = Rc::default();
    let top = Rc::new(Cell::new(0.0));
    let rows = Rc::new(Cell::new(0usize));

    let scheduler = {
        let tasks = Rc::clone(&tasks);
        move |task: Task| tasks.borrow_mut().push(task)
    };
    let loader = |offset: u64, done: Completion<u32>| -> Result<(), LoadError> {
        let start = offset as u32 * 10;
        let end = (start + 10).min(45);
        done.succeed(offset + 1, (start..end).collect());
        Ok(())
    };

    let options = ControllerOptions::new(loader, scheduler)
        .with_page_size(10)
        .with_threshold(100.0)
        .with_viewport(Slot::attached(Rc::new(Window {
            scroll: Cell::new(0.0),
        }) as Rc<dyn Viewport>))
        .with_sentinel(Slot::attached(Rc::new(Barrier {
            top: Rc::clone(&top),
        }) as Rc<dyn Element>))
        .with_on_loaded({
            let top = Rc::clone(&top);
            let rows = Rc::clone(&rows);
            move |offset, items| {
                rows.set(rows.get() + items.len());
                top.set(rows.get() as f64 * 20.0);
                println!("loaded offset={offset} items={items:?}");
            }
        });

    let controller = Controller::new(options);
    controller.enable().expect("controller is alive");

    loop {
        let due: Vec<Task> = tasks.borrow_mut().drain(..).collect();
        if due.is_empty() {
            break;
        }
        for task in due {
            task();
        }
    }
    println!("rows={} state={:?}", rows.get(), controller.snapshot());
}
