//! Shared documents for the crate-level tests.

/// A calendar with an embedded timezone, a recurring event and an alarm.
pub const WEEKLY_MEETING: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example Corp//Meetings//EN\r\n\
BEGIN:VTIMEZONE\r\n\
TZID:America/New_York\r\n\
BEGIN:STANDARD\r\n\
DTSTART:20071104T020000\r\n\
RRULE:FREQ=YEARLY;BYDAY=1SU;BYMONTH=11\r\n\
TZNAME:EST\r\n\
TZOFFSETFROM:-0400\r\n\
TZOFFSETTO:-0500\r\n\
END:STANDARD\r\n\
BEGIN:DAYLIGHT\r\n\
DTSTART:20070311T020000\r\n\
RRULE:FREQ=YEARLY;BYDAY=2SU;BYMONTH=3\r\n\
TZNAME:EDT\r\n\
TZOFFSETFROM:-0500\r\n\
TZOFFSETTO:-0400\r\n\
END:DAYLIGHT\r\n\
END:VTIMEZONE\r\n\
BEGIN:VEVENT\r\n\
UID:weekly-1@example.com\r\n\
DTSTAMP:20050101T000000Z\r\n\
DTSTART;TZID=America/New_York:20050119T090000\r\n\
DURATION:PT1H\r\n\
SUMMARY:Planning\\, weekly\r\n\
DESCRIPTION:Bring the numbers for the quarter. The agenda is long enough \r\n \
that this line has to be folded at least once on the way out.\r\n\
CATEGORIES:MEETING,PLANNING\r\n\
RRULE:FREQ=WEEKLY;COUNT=2;INTERVAL=2;BYDAY=TU,TH\r\n\
BEGIN:VALARM\r\n\
ACTION:DISPLAY\r\n\
DESCRIPTION:Reminder\r\n\
TRIGGER:-PT15M\r\n\
END:VALARM\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

/// A weekly event in a zone only the calendar itself defines.
pub const CUSTOM_ZONE_MEETING: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example Corp//Custom Zone//EN\r\n\
BEGIN:VTIMEZONE\r\n\
TZID:My Zone\r\n\
BEGIN:STANDARD\r\n\
DTSTART:19981025T020000\r\n\
RRULE:FREQ=YEARLY;BYDAY=-1SU;BYMONTH=10\r\n\
TZOFFSETFROM:-0500\r\n\
TZOFFSETTO:-0600\r\n\
END:STANDARD\r\n\
BEGIN:DAYLIGHT\r\n\
DTSTART:19990404T020000\r\n\
RRULE:FREQ=YEARLY;BYDAY=1SU;BYMONTH=4\r\n\
TZOFFSETFROM:-0600\r\n\
TZOFFSETTO:-0500\r\n\
END:DAYLIGHT\r\n\
END:VTIMEZONE\r\n\
BEGIN:VEVENT\r\n\
UID:custom-1@example.com\r\n\
DTSTAMP:19990301T000000Z\r\n\
DTSTART;TZID=My Zone:19990401T080000\r\n\
RRULE:FREQ=WEEKLY;COUNT=2\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

/// A free/busy reply with period values in both forms.
pub const FREEBUSY: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example Corp//Free Busy//EN\r\n\
BEGIN:VFREEBUSY\r\n\
UID:fb-1@example.com\r\n\
DTSTAMP:20060206T001102Z\r\n\
DTSTART:20060216T000000Z\r\n\
DTEND:20060217T000000Z\r\n\
FREEBUSY:20060216T100000Z/PT2H\r\n\
FREEBUSY;FBTYPE=BUSY-TENTATIVE:20060216T150000Z/20060216T160000Z\r\n\
END:VFREEBUSY\r\n\
END:VCALENDAR\r\n";

/// A vCard 3.0 with grouped lines, structured values and a photo.
pub const GROUPED_CARD: &str = "BEGIN:VCARD\r\n\
VERSION:3.0\r\n\
N:Doe;Jane;;Dr.;\r\n\
FN:Dr. Jane Doe\r\n\
ORG:Example Corp;Research\r\n\
home.TEL;TYPE=HOME:+1-555-0100\r\n\
home.ADR;TYPE=HOME:;;12 Main St;Springfield;IL;62701;USA\r\n\
work.EMAIL;TYPE=INTERNET;PREF:jane@example.com\r\n\
PHOTO;ENCODING=b;TYPE=PNG:iVBORw0KGgo=\r\n\
END:VCARD\r\n";

/// A vCard 2.1 with a quoted-printable note split by a soft break.
pub const LEGACY_CARD: &str = "BEGIN:VCARD\r\n\
VERSION:2.1\r\n\
FN:Francois Dupont\r\n\
NOTE;ENCODING=QUOTED-PRINTABLE;CHARSET=ISO-8859-1:Caf=E9 au lait, =\r\n\
s'il vous pla=EEt\r\n\
TEL;CELL;PREF:555-0199\r\n\
END:VCARD\r\n";

pub const TWO_CARDS: &str = "BEGIN:VCARD\r\n\
VERSION:3.0\r\n\
FN:First\r\n\
END:VCARD\r\n\
BEGIN:VCARD\r\n\
VERSION:3.0\r\n\
FN:Second\r\n\
END:VCARD\r\n";

/// An event with a UID too many.
pub const DOUBLE_UID: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example Corp//Broken//EN\r\n\
BEGIN:VEVENT\r\n\
UID:one@example.com\r\n\
UID:two@example.com\r\n\
DTSTAMP:20050101T000000Z\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

/// Output of a producer that writes underscores in names.
pub const UNDERSCORE_NAMES: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Legacy//EN\r\n\
X_LEGACY_FLAG:on\r\n\
END:VCALENDAR\r\n";
