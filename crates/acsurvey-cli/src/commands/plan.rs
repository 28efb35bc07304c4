use acsurvey_core::ChannelPlan;

pub fn run(band: &str) -> i32 {
    let plan = ChannelPlan::for_band(super::parse_band(band));
    let enabled = plan.channels.iter().filter(|c| !c.disabled).count();

    println!("{} band: {} channel(s), {} enabled\n", plan.band, plan.channels.len(), enabled);
    for chan in &plan.channels {
        let mark = if chan.disabled { "\u{2717}" } else { "\u{2713}" };
        println!("  {mark} {:>4}  {:>5} MHz", chan.chan, chan.freq);
    }
    0
}
