//! The built-in grid catalog.

use meridian_protocol::GridInfo;

/// Well-known grids every fresh install starts with, in display order.
pub fn default_grids() -> Vec<GridInfo> {
    vec![
        GridInfo::new(
            "Second Life",
            "https://login.agni.lindenlab.com/cgi-bin/login.cgi",
            "agni",
        ),
        GridInfo::new(
            "Second Life Beta",
            "https://login.aditi.lindenlab.com/cgi-bin/login.cgi",
            "aditi",
        ),
        GridInfo::new("OSGrid", "http://login.osgrid.org/", "osgrid"),
        GridInfo::new("Kitely", "https://grid.kitely.com:8002/", "kitely"),
        GridInfo::new("Metropolis", "http://hypergrid.org:8002/", "metropolis"),
        GridInfo::new("Local OpenSim", "http://localhost:9000/", "local"),
    ]
}
