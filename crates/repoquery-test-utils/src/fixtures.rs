//! Canned package-tool output for parser and end-to-end tests
//!
//! The texts follow the real output of `apt-cache` on Debian bookworm and
//! `make search` in a FreeBSD ports tree closely enough to exercise every
//! branch the parsers have: multi-stanza policy listings, `(none)`
//! candidates, folded description fields, moved ports, and index entries
//! missing mandatory fields.

/// `apt-cache -q=2 -a policy` output covering two packages.
pub const APT_POLICY_APACHE: &str = "\
apache2:
  Installed: (none)
  Candidate: 2.4.62-1~deb12u2
  Version table:
     2.4.62-1~deb12u2 500
        500 http://deb.debian.org/debian bookworm/main amd64 Packages
apache2-utils:
  Installed: 2.4.62-1~deb12u2
  Candidate: 2.4.62-1~deb12u2
  Version table:
 *** 2.4.62-1~deb12u2 500
        500 http://deb.debian.org/debian bookworm/main amd64 Packages
        100 /var/lib/dpkg/status
";

/// Policy output where one package has no installable candidate.
pub const APT_POLICY_WITH_NONE: &str = "\
apache2:
  Installed: (none)
  Candidate: 2.4.62-1~deb12u2
  Version table:
     2.4.62-1~deb12u2 500
        500 http://deb.debian.org/debian bookworm/main amd64 Packages
obsolete-pkg:
  Installed: (none)
  Candidate: (none)
  Version table:
";

/// `apt-cache -q=2 -a show` output: two versions of one package, with a
/// folded description and a blank continuation marker.
pub const APT_SHOW_APACHE2: &str = "\
Package: apache2
Version: 2.4.62-1~deb12u2
Installed-Size: 561
Maintainer: Debian Apache Maintainers <debian-apache@lists.debian.org>
Architecture: amd64
Depends: apache2-bin (= 2.4.62-1~deb12u2), apache2-data (= 2.4.62-1~deb12u2)
Description-en: Apache HTTP Server
 The Apache HTTP Server Project's goal is to build a secure, efficient and
 extensible HTTP server as standards-compliant open source software.
 .
 Installing this package results in a full installation, including the
 configuration files, init scripts and support scripts.
Homepage: https://httpd.apache.org/

Package: apache2
Version: 2.4.57-2
Installed-Size: 559
Maintainer: Debian Apache Maintainers <debian-apache@lists.debian.org>
Architecture: amd64
Description-en: Apache HTTP Server
 The Apache HTTP Server Project's goal is to build a secure, efficient and
 extensible HTTP server as standards-compliant open source software.
";

/// `make search` output mixing regular ports, a moved port, an entry
/// without a `Path` field, and a `Port` value without a version suffix.
pub const PORTS_SEARCH_MIXED: &str = "\
Port:   apache24-2.4.62
Path:   /usr/ports/www/apache24
Info:   Version 2.4.x of Apache web server
Maint:  apache@FreeBSD.org
B-deps: apr-1.7.5.1.6.3
R-deps: apr-1.7.5.1.6.3
WWW:    https://httpd.apache.org/

Port:   apache22-2.2.34_1
Moved:  www/apache24
Date:   2017-07-01
Reason: Has expired: EOLd by upstream

Port:   bash-5.2.37
Path:   /usr/ports/shells/bash
Info:   GNU Project's Bourne Again SHell
Maint:  ehaupt@FreeBSD.org
B-deps: bison-3.8.2,1 gettext-runtime-0.22.5
R-deps: gettext-runtime-0.22.5
WWW:    https://www.gnu.org/software/bash/

Port:   stray-entry-1.0
Info:   An index entry missing its Path field

Port:   noversion
Path:   /usr/ports/misc/noversion
Info:   A Port value the name/version split cannot handle
";
