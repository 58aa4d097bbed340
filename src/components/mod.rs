mod nav_menu_link;

pub use nav_menu_link::NavMenuLink;
