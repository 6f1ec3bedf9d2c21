//! Plain-text landing page.

const HOME: &str = "Citybikes GBFS API
------------------

Welcome to the Citybikes GBFS API.

This endpoint provides real-time bike share information in GBFS format.

Urls look like:

GET {endpoint}<version>/<network>/<feed>.json

For example:

GET {endpoint}2/bicing/gbfs.json
GET {endpoint}2/bicing/system_information.json

GET {endpoint}3/manifest.json
GET {endpoint}3/bicing/gbfs.json
GET {endpoint}3/bicing/system_information.json


See the full list of networks available at https://citybik.es

Enjoy!

----

GBFS: https://gbfs.org
Docs: https://docs.citybik.es/api/gbfs
Code: https://github.com/citybikes/gbfs-api
";

/// Render the landing page for a service reachable at `base`.
///
/// `base` carries no trailing slash.
pub(crate) fn render(base: &str) -> String {
    HOME.replace("{endpoint}", &format!("{base}/"))
}
