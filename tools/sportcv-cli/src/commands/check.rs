//! Check that the video decoder is usable.

use sportcv_analysis_engine::gst_video::decoder_capabilities;

pub fn run() -> anyhow::Result<()> {
    println!("SportCV System Check");
    println!("{}", "=".repeat(50));

    let capabilities = match decoder_capabilities() {
        Ok(caps) => {
            println!("[OK] GStreamer initialized");
            caps
        }
        Err(e) => {
            println!("[FAIL] {e}");
            println!("\nInstall GStreamer and its base plugins to analyze videos.");
            return Ok(());
        }
    };

    for cap in &capabilities {
        if cap.available {
            println!("[OK] Element: {}", cap.element);
        } else {
            println!("[MISSING] Element: {}", cap.element);
        }
    }

    println!();
    if capabilities.iter().all(|c| c.available) {
        println!("All decoder elements are available. SportCV is ready.");
    } else {
        println!("Some decoder elements are missing. Install gst-plugins-base.");
    }

    Ok(())
}
