use std::env;
use std::path::{Path, PathBuf};
use std::process;

use kitbag_client::{
    capture::SessionCapture,
    network::RecordingTransport,
    settings::{default_settings_path, SyncSettings},
    sync::{FrameOutcome, LoggingListener, SyncHandler},
};
use kitbag_core::equip_slot::EquipSlot;

fn usage() -> ! {
    eprintln!("usage: kitbag-replay <capture> [settings.json]");
    process::exit(2);
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let capture_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => usage(),
    };
    let settings_path = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(default_settings_path);

    let mut settings = SyncSettings::load(&settings_path);

    kitbag_core::initialize_logger(settings.level_filter(), settings.log_file.as_deref())
        .unwrap_or_else(|e| {
            eprintln!("Failed to initialize logger: {}. Exiting.", e);
            process::exit(1);
        });

    if let Err(e) = run(&capture_path, &mut settings) {
        log::error!("Replay failed: {e:#}");
        process::exit(1);
    }
}

fn run(capture_path: &Path, settings: &mut SyncSettings) -> anyhow::Result<()> {
    let capture = SessionCapture::load(capture_path)?;
    if capture.dialect != settings.dialect {
        log::warn!(
            "Capture was recorded with the {} dialect, settings say {}; using {}",
            capture.dialect,
            settings.dialect,
            capture.dialect
        );
        settings.dialect = capture.dialect;
    }

    let transport = RecordingTransport::new();
    let mut handler = SyncHandler::from_settings(settings, Box::new(transport.clone()));
    handler.add_listener(Box::new(LoggingListener));

    let (mut applied, mut ignored, mut discarded) = (0usize, 0usize, 0usize);
    for frame in &capture.frames {
        match handler.handle_frame(frame) {
            FrameOutcome::Applied => applied += 1,
            FrameOutcome::Ignored => ignored += 1,
            FrameOutcome::Discarded => discarded += 1,
        }
    }
    log::info!(
        "Replayed {} frames: {} applied, {} ignored, {} discarded",
        capture.frames.len(),
        applied,
        ignored,
        discarded
    );

    print_state(&handler);
    Ok(())
}

fn print_state(handler: &SyncHandler) {
    let items = handler.inventory().items();
    println!(
        "Inventory ({}/{} slots used):",
        items.slots_used(),
        items.capacity()
    );
    for item in items.iter() {
        println!(
            "  [{:3}] item {:6} x{:<5}{}",
            item.container_index(),
            item.type_id(),
            item.quantity(),
            if item.is_equipped() { " (equipped)" } else { "" }
        );
    }

    println!("Equipment:");
    for slot in EquipSlot::ALL {
        match handler.inventory().equipped_item(slot) {
            Some(item) => println!(
                "  {:<10} [{:3}] item {}",
                slot.label(),
                item.container_index(),
                item.type_id()
            ),
            None => println!("  {:<10} -", slot.label()),
        }
    }

    let storage = handler.storage();
    println!("Storage: {}", storage.state());
    if let Some(container) = storage.container() {
        println!(
            "  {}/{} slots used",
            container.slots_used(),
            container.capacity()
        );
        for item in container.iter() {
            println!(
                "  [{:3}] item {:6} x{}",
                item.container_index(),
                item.type_id(),
                item.quantity()
            );
        }
    }
}
