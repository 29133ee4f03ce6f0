use crate::binning::BinnedData;
use crate::sites::LaunchSiteIndex;
use crate::stats::{aggregate, AggregateParams};

/// Aggregate every binned site and attach the results to the index.
///
/// Returns the number of sites that had enough data for a result.
pub fn analyse_sites(
    binned: &BinnedData,
    index: &mut LaunchSiteIndex,
    params: &AggregateParams,
) -> usize {
    let mut analysed = 0;

    for (site_id, bin) in binned.iter() {
        let stats = aggregate(bin.serial_data.values(), params);

        let line = match stats {
            Some(stats) => {
                analysed += 1;
                match index.get_mut(site_id) {
                    Some(site) => site.apply_stats(&stats),
                    None => log::warn!("Binned site {} is not in the launch site dataset", site_id),
                }
                stats.summary_line()
            }
            None => "Not enough data for analysis.".to_string(),
        };

        let name = index
            .get(site_id)
            .map_or(bin.site.name.as_str(), |site| site.name.as_str());
        log::info!(
            "{} ({}): {} sondes - {}",
            name,
            site_id,
            bin.serials.len(),
            line
        );
    }

    analysed
}
